use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::reports::ReportRow;
use crate::error::{AppError, AppResult};
use crate::pipeline::{self, generate_report, PartialContent, ReportContent, ReportRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBody {
    pub template: String,
    pub date_range: Option<Vec<String>>,
    #[serde(default)]
    pub training_types: Vec<String>,
    #[serde(default)]
    pub sessions: Vec<i64>,
    pub current_content: Option<PartialContent>,
}

impl AnalysisBody {
    fn into_request(self) -> Result<ReportRequest, AppError> {
        let date_range = match self.date_range {
            None => None,
            Some(range) if range.is_empty() => None,
            Some(range) if range.len() == 2 => {
                let mut it = range.into_iter();
                Some((it.next().unwrap(), it.next().unwrap()))
            }
            Some(_) => {
                return Err(AppError::Validation(
                    "dateRange must contain exactly two dates".into(),
                ));
            }
        };

        Ok(ReportRequest {
            template: self.template,
            date_range,
            training_categories: pipeline::parse_categories(&self.training_types),
            session_ids: self.sessions,
            partial_content: self.current_content,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Runs the synthesis pipeline for one request. Never fails for
/// generation-quality reasons; the only error path is a request the
/// pipeline cannot be started from.
pub async fn analyze_report(
    State(state): State<AppState>,
    Json(body): Json<AnalysisBody>,
) -> AppResult<Json<ReportContent>> {
    let request = body.into_request()?;
    let report = generate_report(state.chat_client.as_ref(), &request).await;
    Ok(Json(report))
}

pub async fn create_report(
    State(state): State<AppState>,
    Json(content): Json<ReportContent>,
) -> AppResult<Json<serde_json::Value>> {
    if content.title.is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }

    let id = crate::db::reports::insert_report(&state.pool, &content).await?;

    Ok(Json(json!({ "id": id })))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReportContent>> {
    let row = crate::db::reports::get_report(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

    Ok(Json(row.into_content()))
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<ReportRow>>> {
    let limit = params.limit.unwrap_or(20);
    let offset = params.offset.unwrap_or(0);

    let reports = crate::db::reports::list_reports(&state.pool, limit, offset).await?;

    Ok(Json(reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Category;

    #[test]
    fn test_analysis_body_deserialize() {
        let body: AnalysisBody = serde_json::from_str(
            r#"{
                "template": "monthly",
                "dateRange": ["2025-04-01", "2025-04-30"],
                "trainingTypes": ["forehand", "smash"],
                "sessions": [1, 2],
                "currentContent": {"title": "草稿"}
            }"#,
        )
        .unwrap();
        let request = body.into_request().unwrap();
        assert_eq!(request.template, "monthly");
        assert_eq!(
            request.date_range,
            Some(("2025-04-01".to_string(), "2025-04-30".to_string()))
        );
        // Unknown tags dropped, not rejected.
        assert_eq!(request.training_categories, vec![Category::Forehand]);
        assert_eq!(request.session_ids, vec![1, 2]);
        assert_eq!(
            request.partial_content.unwrap().title.as_deref(),
            Some("草稿")
        );
    }

    #[test]
    fn test_analysis_body_minimal() {
        let body: AnalysisBody = serde_json::from_str(r#"{"template": "simple"}"#).unwrap();
        let request = body.into_request().unwrap();
        assert!(request.date_range.is_none());
        assert!(request.training_categories.is_empty());
        assert!(request.partial_content.is_none());
    }

    #[test]
    fn test_analysis_body_odd_date_range_rejected() {
        let body: AnalysisBody =
            serde_json::from_str(r#"{"template": "m", "dateRange": ["2025-04-01"]}"#).unwrap();
        assert!(body.into_request().is_err());
    }

    #[test]
    fn test_analysis_body_empty_date_range_is_unspecified() {
        let body: AnalysisBody =
            serde_json::from_str(r#"{"template": "m", "dateRange": []}"#).unwrap();
        assert!(body.into_request().unwrap().date_range.is_none());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, None);
        assert_eq!(query.offset, None);
    }
}
