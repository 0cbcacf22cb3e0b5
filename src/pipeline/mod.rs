pub mod decode;
pub mod fallback;
pub mod merge;
pub mod orchestrator;
pub mod prompt;

use serde::{Deserialize, Serialize};

pub use orchestrator::generate_report;

/// Closed vocabulary of training-skill tags. Unknown tags coming in from
/// callers are dropped during parsing, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Forehand,
    Backhand,
    Footwork,
    Serve,
}

impl Category {
    /// Fixed vocabulary order; fallback synthesis and conclusion clauses
    /// iterate in this order regardless of request iteration order.
    pub const ALL: [Category; 4] = [
        Category::Forehand,
        Category::Backhand,
        Category::Footwork,
        Category::Serve,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "forehand" => Some(Category::Forehand),
            "backhand" => Some(Category::Backhand),
            "footwork" => Some(Category::Footwork),
            "serve" => Some(Category::Serve),
            _ => None,
        }
    }

    /// Human-readable name used when rendering prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Forehand => "正手",
            Category::Backhand => "反手",
            Category::Footwork => "步法",
            Category::Serve => "发球",
        }
    }
}

/// Parses caller-supplied tags into the closed vocabulary, silently
/// dropping anything unrecognized.
pub fn parse_categories(tags: &[String]) -> Vec<Category> {
    tags.iter().filter_map(|t| Category::parse(t)).collect()
}

/// Validated pipeline input. Immutable through a single `generate_report`
/// invocation.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub template: String,
    pub date_range: Option<(String, String)>,
    pub training_categories: Vec<Category>,
    /// Opaque session identifiers, echoed into the prompt for context
    /// only. Never dereferenced here.
    pub session_ids: Vec<i64>,
    pub partial_content: Option<PartialContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// The structured report. After assembly `title` is non-empty and
/// `sections` contains at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContent {
    pub title: String,
    pub summary: String,
    pub sections: Vec<Section>,
    pub conclusion: String,
    pub suggestions: String,
}

/// User-authored partial report. Any subset of fields may be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialContent {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub sections: Option<Vec<Section>>,
    pub conclusion: Option<String>,
    pub suggestions: Option<String>,
}
