use super::{PartialContent, ReportContent};

/// Overlays user-authored fields onto generated output. Each scalar field
/// is merged independently: a present, non-empty partial value wins.
///
/// Sections are never overridden — they always come from the generated
/// report, even when the partial content carries its own. This asymmetry
/// is a deliberate contract, not an oversight: user section edits are
/// treated as prompt context (their titles are listed in the prompt), and
/// the generated structure is authoritative.
pub fn merge(generated: ReportContent, partial: Option<&PartialContent>) -> ReportContent {
    let Some(partial) = partial else {
        return generated;
    };

    let pick = |ours: Option<&String>, generated: String| -> String {
        match ours.filter(|s| !s.is_empty()) {
            Some(s) => s.clone(),
            None => generated,
        }
    };

    ReportContent {
        title: pick(partial.title.as_ref(), generated.title),
        summary: pick(partial.summary.as_ref(), generated.summary),
        sections: generated.sections,
        conclusion: pick(partial.conclusion.as_ref(), generated.conclusion),
        suggestions: pick(partial.suggestions.as_ref(), generated.suggestions),
    }
}
