use crate::llm::GenerationClient;

use super::{decode, fallback, merge, prompt, ReportContent, ReportRequest};

/// Runs the full synthesis pipeline for one request: build the prompt,
/// call the external service once, decode whatever comes back, fall back
/// to rule-based synthesis when the call fails or nothing decodes, then
/// overlay user-authored fields.
///
/// Total by construction: transport and decode failures are absorbed
/// here, logged at warn, and never surface to the caller. The returned
/// report always has a non-empty title and at least one section.
#[tracing::instrument(
    name = "pipeline report",
    skip(client, request),
    fields(
        report.template = %request.template,
        report.categories = request.training_categories.len(),
        report.decoded,
        report.fallback,
    )
)]
pub async fn generate_report(
    client: &dyn GenerationClient,
    request: &ReportRequest,
) -> ReportContent {
    let prompt = prompt::build_prompt(request);

    let decoded = match client.generate(&prompt).await {
        Ok(raw) => {
            let decoded = decode::decode(&raw);
            if decoded.is_none() {
                tracing::warn!(
                    response_len = raw.len(),
                    "model output not decodable, using fallback synthesis"
                );
            }
            decoded
        }
        Err(err) => {
            tracing::warn!(error = %err, "generation call failed, using fallback synthesis");
            None
        }
    };

    let span = tracing::Span::current();
    span.record("report.decoded", decoded.is_some());
    span.record("report.fallback", decoded.is_none());

    let generated = decoded.unwrap_or_else(|| fallback::synthesize(&request.training_categories));

    merge::merge(generated, request.partial_content.as_ref())
}
