use serde::Deserialize;

use super::fallback::DEFAULT_TITLE;
use super::{ReportContent, Section};

const GENERIC_PARSED_SECTION_TITLE: &str = "综合分析";
const GENERIC_PARSED_SECTION_CONTENT: &str = "基于训练数据的综合分析结果。";

/// Turns raw model output into a structured report. Three stages, each
/// attempted only if the prior one yields nothing: direct JSON parse,
/// sanitized JSON parse, free-text outline extraction. `None` means no
/// stage produced a usable report and the caller should fall back to
/// rule-based synthesis.
pub fn decode(raw: &str) -> Option<ReportContent> {
    decode_json(raw)
        .or_else(|| decode_sanitized(raw))
        .or_else(|| decode_outline(raw))
}

#[derive(Deserialize)]
struct RawReport {
    title: Option<String>,
    summary: Option<String>,
    sections: Option<Vec<RawSection>>,
    conclusion: Option<String>,
    suggestions: Option<String>,
}

#[derive(Deserialize)]
struct RawSection {
    title: Option<String>,
    content: Option<String>,
}

/// Stage 1: the text is a JSON object with the expected keys. Missing
/// keys default to empty; an empty section list is backfilled with one
/// generic section so the output invariant holds.
fn decode_json(raw: &str) -> Option<ReportContent> {
    let parsed: RawReport = serde_json::from_str(raw).ok()?;

    let mut sections: Vec<Section> = parsed
        .sections
        .unwrap_or_default()
        .into_iter()
        .map(|s| Section {
            title: s.title.unwrap_or_default(),
            content: s.content.unwrap_or_default(),
        })
        .collect();

    if sections.is_empty() {
        sections.push(Section {
            title: GENERIC_PARSED_SECTION_TITLE.to_string(),
            content: GENERIC_PARSED_SECTION_CONTENT.to_string(),
        });
    }

    Some(ReportContent {
        title: parsed.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        summary: parsed.summary.unwrap_or_default(),
        sections,
        conclusion: parsed.conclusion.unwrap_or_default(),
        suggestions: parsed.suggestions.unwrap_or_default(),
    })
}

/// Stage 2: many models wrap JSON in chatter or code fences. Take the
/// span from the first `{` to the last `}` inclusive, strip backticks,
/// collapse whitespace runs, and retry the direct parse.
///
/// The span extraction is intentionally not brace-depth aware: if the
/// surrounding prose itself contains unbalanced braces the wrong span is
/// selected and the parse fails. Callers depend on this exact failure
/// mode; see DESIGN.md before changing it.
fn decode_sanitized(raw: &str) -> Option<ReportContent> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    let mut candidate = String::with_capacity(end - start + 1);
    let mut in_whitespace = false;
    for c in raw[start..=end].chars() {
        if c == '`' {
            continue;
        }
        if c.is_whitespace() {
            if !in_whitespace {
                candidate.push(' ');
            }
            in_whitespace = true;
        } else {
            candidate.push(c);
            in_whitespace = false;
        }
    }

    decode_json(&candidate)
}

fn strip_heading(line: &str) -> Option<&str> {
    line.strip_prefix("### ")
        .or_else(|| line.strip_prefix("## "))
        .map(str::trim)
}

/// Matches `label` at the start of `text`, ASCII-case-insensitively, and
/// returns what follows. With `require_colon` the label must be followed
/// by a half- or full-width colon (the plain-line `结论：` form);
/// otherwise a bare heading like `## 结论` also matches.
fn match_label<'a>(text: &'a str, label: &str, require_colon: bool) -> Option<&'a str> {
    let head = text.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = text[label.len()..].trim_start();
    if let Some(after) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('：')) {
        return Some(after.trim());
    }
    if require_colon { None } else { Some(rest) }
}

fn labeled<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    if let Some(heading) = strip_heading(line) {
        labels
            .iter()
            .find_map(|l| match_label(heading, l, false))
    } else {
        labels.iter().find_map(|l| match_label(line, l, true))
    }
}

/// Stage 3: line-oriented extraction from markdown-ish prose. `# ` or a
/// `标题：` label gives the title; summary/conclusion/suggestion labels
/// capture the rest of their line or, when empty, the following line;
/// any other `##`/`###` heading opens a section that accumulates lines
/// until the next heading or end of input. Yields `Some` only if at
/// least one section was extracted.
fn decode_outline(raw: &str) -> Option<ReportContent> {
    const SUMMARY_LABELS: &[&str] = &["摘要", "summary"];
    const CONCLUSION_LABELS: &[&str] = &["结论", "conclusion"];
    const SUGGESTION_LABELS: &[&str] = &["建议", "suggestions", "suggestion"];

    let lines: Vec<&str> = raw.lines().map(str::trim).collect();

    let mut title: Option<String> = None;
    let mut summary: Option<String> = None;
    let mut conclusion: Option<String> = None;
    let mut suggestions: Option<String> = None;
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<(String, String)> = None;

    let flush = |current: &mut Option<(String, String)>, sections: &mut Vec<Section>| {
        if let Some((section_title, content)) = current.take() {
            sections.push(Section {
                title: section_title,
                content: content.trim().to_string(),
            });
        }
    };

    // Captures the label remainder, or the following line when the
    // remainder is empty (consuming it).
    let capture = |value: &str, lines: &[&str], i: &mut usize| -> String {
        if !value.is_empty() {
            return value.to_string();
        }
        if *i + 1 < lines.len() {
            *i += 1;
            return lines[*i].to_string();
        }
        String::new()
    };

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() {
            i += 1;
            continue;
        }

        if let Some(rest) = line.strip_prefix("# ") {
            flush(&mut current, &mut sections);
            title = Some(rest.trim().to_string());
        } else if let Some(rest) = match_label(line, "标题", true) {
            flush(&mut current, &mut sections);
            title = Some(rest.to_string());
        } else if let Some(rest) = labeled(line, SUMMARY_LABELS) {
            flush(&mut current, &mut sections);
            summary = Some(capture(rest, &lines, &mut i));
        } else if let Some(rest) = labeled(line, CONCLUSION_LABELS) {
            flush(&mut current, &mut sections);
            conclusion = Some(capture(rest, &lines, &mut i));
        } else if let Some(rest) = labeled(line, SUGGESTION_LABELS) {
            flush(&mut current, &mut sections);
            suggestions = Some(capture(rest, &lines, &mut i));
        } else if let Some(heading) = strip_heading(line) {
            flush(&mut current, &mut sections);
            current = Some((heading.to_string(), String::new()));
        } else if let Some((_, content)) = current.as_mut() {
            content.push_str(line);
            content.push('\n');
        }

        i += 1;
    }

    flush(&mut current, &mut sections);

    if sections.is_empty() {
        return None;
    }

    Some(ReportContent {
        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        summary: summary.unwrap_or_default(),
        sections,
        conclusion: conclusion.unwrap_or_default(),
        suggestions: suggestions.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_direct_json() {
        let report = decode(r#"{"title":"A","sections":[]}"#).unwrap();
        assert_eq!(report.title, "A");
        // Empty section list backfilled with one generic section.
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].title, "综合分析");
        assert_eq!(report.summary, "");
    }

    #[test]
    fn test_decode_direct_json_full() {
        let raw = r#"{
            "title": "四月训练报告",
            "summary": "本月进步明显。",
            "sections": [{"title": "正手", "content": "动作更稳定。"}],
            "conclusion": "继续保持。",
            "suggestions": "增加多球训练。"
        }"#;
        let report = decode(raw).unwrap();
        assert_eq!(report.title, "四月训练报告");
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].content, "动作更稳定。");
        assert_eq!(report.conclusion, "继续保持。");
    }

    #[test]
    fn test_decode_json_missing_title_defaults() {
        let report = decode(r#"{"sections":[{"title":"S","content":"C"}]}"#).unwrap();
        assert_eq!(report.title, "乒乓球技术提高训练分析报告");
        assert_eq!(report.sections[0].title, "S");
    }

    #[test]
    fn test_decode_embedded_json() {
        let report = decode(r#"noise {"title":"B"} noise"#).unwrap();
        assert_eq!(report.title, "B");
    }

    #[test]
    fn test_decode_fenced_json() {
        let raw = "Here is the report:\n```json\n{\"title\": \"C\", \"sections\": []}\n```";
        let report = decode(raw).unwrap();
        assert_eq!(report.title, "C");
    }

    #[test]
    fn test_sanitized_collapses_whitespace() {
        let raw = "result:\n{\n  \"title\":\n  \"D\"\n}";
        let report = decode(raw).unwrap();
        assert_eq!(report.title, "D");
    }

    #[test]
    fn test_brace_span_not_depth_aware() {
        // A stray closing brace in trailing prose widens the span and
        // breaks the parse; the outline stage then finds no headings, so
        // the whole decode yields nothing. Kept for behavioral fidelity.
        let raw = r#"{"title":"E","sections":[]} trailing prose with a stray }"#;
        assert!(decode(raw).is_none());
    }

    #[test]
    fn test_decode_outline_sections_and_conclusion() {
        let raw = "## Forehand\nGood progress.\n## 结论\nKeep practicing.";
        let report = decode(raw).unwrap();
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].title, "Forehand");
        assert_eq!(report.sections[0].content, "Good progress.");
        assert_eq!(report.conclusion, "Keep practicing.");
        assert_eq!(report.title, "乒乓球技术提高训练分析报告");
    }

    #[test]
    fn test_decode_outline_chinese_labels() {
        let raw = "# 训练报告\n摘要：进步明显\n## 步法分析\n移动速度提升。\n变向仍需加强。\n结论：整体向好\n建议：坚持训练";
        let report = decode(raw).unwrap();
        assert_eq!(report.title, "训练报告");
        assert_eq!(report.summary, "进步明显");
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].title, "步法分析");
        assert_eq!(report.sections[0].content, "移动速度提升。\n变向仍需加强。");
        assert_eq!(report.conclusion, "整体向好");
        assert_eq!(report.suggestions, "坚持训练");
    }

    #[test]
    fn test_decode_outline_label_value_on_following_line() {
        let raw = "## Serve\nSpin improved.\n## 建议\n多练不同落点组合。";
        let report = decode(raw).unwrap();
        assert_eq!(report.suggestions, "多练不同落点组合。");
        assert_eq!(report.sections.len(), 1);
    }

    #[test]
    fn test_decode_outline_without_sections_is_empty() {
        // A title alone does not make a usable report.
        assert!(decode("# 只有标题").is_none());
    }

    #[test]
    fn test_decode_plain_prose_is_empty() {
        assert!(decode("The player trained hard and improved a lot.").is_none());
        assert!(decode("").is_none());
    }

    #[test]
    fn test_outline_heading_labels_case_insensitive() {
        let raw = "## Backhand\nSteadier now.\n## Conclusion\nWell done.";
        let report = decode(raw).unwrap();
        assert_eq!(report.conclusion, "Well done.");
        assert_eq!(report.sections[0].title, "Backhand");
    }
}
