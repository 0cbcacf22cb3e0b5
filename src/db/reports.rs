use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::pipeline::{ReportContent, Section};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReportRow {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub sections: serde_json::Value,
    pub conclusion: String,
    pub suggestions: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl ReportRow {
    /// Rehydrates the stored row into pipeline content. Rows written by
    /// this service always hold a valid section array; anything else
    /// (hand-edited rows) degrades to an empty list.
    pub fn into_content(self) -> ReportContent {
        let sections: Vec<Section> = serde_json::from_value(self.sections).unwrap_or_default();
        ReportContent {
            title: self.title,
            summary: self.summary,
            sections,
            conclusion: self.conclusion,
            suggestions: self.suggestions,
        }
    }
}

#[tracing::instrument(name = "db.reports.insert", skip_all)]
pub async fn insert_report(pool: &PgPool, content: &ReportContent) -> Result<Uuid, sqlx::Error> {
    let sections = serde_json::to_value(&content.sections).unwrap_or_default();

    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO reports (id, title, summary, sections, conclusion, suggestions) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(&content.title)
    .bind(&content.summary)
    .bind(&sections)
    .bind(&content.conclusion)
    .bind(&content.suggestions)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

#[tracing::instrument(name = "db.reports.get", skip(pool))]
pub async fn get_report(pool: &PgPool, id: Uuid) -> Result<Option<ReportRow>, sqlx::Error> {
    sqlx::query_as::<_, ReportRow>(
        "SELECT id, title, summary, sections, conclusion, suggestions, created_at \
         FROM reports WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[tracing::instrument(name = "db.reports.list", skip(pool))]
pub async fn list_reports(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReportRow>, sqlx::Error> {
    sqlx::query_as::<_, ReportRow>(
        "SELECT id, title, summary, sections, conclusion, suggestions, created_at \
         FROM reports ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_into_content() {
        let row = ReportRow {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            summary: "S".to_string(),
            sections: serde_json::json!([{"title": "A", "content": "B"}]),
            conclusion: "C".to_string(),
            suggestions: "G".to_string(),
            created_at: None,
        };
        let content = row.into_content();
        assert_eq!(content.sections.len(), 1);
        assert_eq!(content.sections[0].title, "A");
    }

    #[test]
    fn test_row_into_content_bad_sections_degrade_to_empty() {
        let row = ReportRow {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            summary: String::new(),
            sections: serde_json::json!("not an array"),
            conclusion: String::new(),
            suggestions: String::new(),
            created_at: None,
        };
        assert!(row.into_content().sections.is_empty());
    }
}
