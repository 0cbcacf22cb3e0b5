use std::fmt::Write;

use super::ReportRequest;

/// Renders the generation prompt for a request. Pure and deterministic:
/// the same request always produces byte-identical output. Field order is
/// fixed — template, categories, date range, sessions, the
/// already-authored block, then the output-format directive.
pub fn build_prompt(request: &ReportRequest) -> String {
    let mut prompt = String::from("请根据以下信息生成一份乒乓球训练分析报告：\n\n");

    let _ = writeln!(prompt, "报告模板：{}", request.template);

    if !request.training_categories.is_empty() {
        let labels: Vec<&str> = request
            .training_categories
            .iter()
            .map(|c| c.label())
            .collect();
        let _ = writeln!(prompt, "训练类型：{}", labels.join("、"));
    }

    if let Some((start, end)) = &request.date_range {
        let _ = writeln!(prompt, "分析日期范围：{start} 至 {end}");
    }

    if !request.session_ids.is_empty() {
        let ids: Vec<String> = request.session_ids.iter().map(|id| id.to_string()).collect();
        let _ = writeln!(prompt, "训练会话：{}", ids.join("、"));
    }

    if let Some(partial) = &request.partial_content {
        prompt.push_str("\n当前已有内容：\n");

        if let Some(title) = partial.title.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(prompt, "标题：{title}");
        }
        if let Some(summary) = partial.summary.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(prompt, "摘要：{summary}");
        }
        if let Some(sections) = partial.sections.as_deref().filter(|s| !s.is_empty()) {
            prompt.push_str("章节：\n");
            for section in sections {
                if !section.title.is_empty() {
                    let _ = writeln!(prompt, "- {}", section.title);
                }
            }
        }
        if let Some(conclusion) = partial.conclusion.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(prompt, "结论：{conclusion}");
        }
        if let Some(suggestions) = partial.suggestions.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(prompt, "建议：{suggestions}");
        }
    }

    prompt.push_str(
        "\n请生成以下内容：\n\
         1. 报告标题\n\
         2. 报告摘要\n\
         3. 针对各训练类型的分析章节（每个章节包含标题和内容）\n\
         4. 总体结论\n\
         5. 训练建议\n\
         \n\
         请以JSON格式返回，格式如下：\n\
         {\n\
         \x20 \"title\": \"报告标题\",\n\
         \x20 \"summary\": \"报告摘要\",\n\
         \x20 \"sections\": [\n\
         \x20   {\n\
         \x20     \"title\": \"章节标题1\",\n\
         \x20     \"content\": \"章节内容1\"\n\
         \x20   },\n\
         \x20   {\n\
         \x20     \"title\": \"章节标题2\",\n\
         \x20     \"content\": \"章节内容2\"\n\
         \x20   }\n\
         \x20 ],\n\
         \x20 \"conclusion\": \"总体结论\",\n\
         \x20 \"suggestions\": \"训练建议\"\n\
         }\n",
    );

    prompt
}
