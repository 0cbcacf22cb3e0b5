use super::{Category, ReportContent, Section};

pub(crate) const DEFAULT_TITLE: &str = "乒乓球技术提高训练分析报告";

const DEFAULT_SUMMARY: &str = "本报告基于近期的训练数据和视频分析，对训练效果进行了全面评估，\
    并提出有针对性的训练建议。通过分析发现，技术水平整体呈上升趋势，但各项技术发展不均衡，\
    需要有针对性地加强训练。";

const DEFAULT_SUGGESTIONS: &str = "1. 每周安排2次反手专项训练，重点提高反手稳定性和应对旋转球的能力。\n\
    2. 增加步法训练频率，每次训练前进行15分钟的专项步法练习。\n\
    3. 安排1-2次对抗训练，提高实战应变能力。\n\
    4. 使用视频录制训练过程，进行动作比对和纠正。";

const GENERIC_SECTION_TITLE: &str = "技术综合分析";

const GENERIC_SECTION_CONTENT: &str = "通过对近期训练数据的分析，您的整体技术水平呈现上升趋势。\
    球路多变性和战术意识有了明显提升，但在面对高强度对抗时技术稳定性仍需加强。\
    建议在后续训练中增加高强度模拟比赛环节，提高实战能力。";

fn canned_section(category: Category) -> Section {
    let (title, content) = match category {
        Category::Forehand => (
            "正手技术分析",
            "正手击球动作规范度提升了15%，力量和速度也有明显提高。击球点位置把握更加准确，\
             但在高速球处理时仍有不稳定情况。建议增加高速球应对训练，提高应变能力。",
        ),
        Category::Backhand => (
            "反手技术分析",
            "反手技术相比上月有5%的提升，但仍是相对薄弱环节。反手拉球质量不够稳定，\
             特别是处理旋转球时。建议加强反手基本功训练，增加对不同旋转球的适应性训练。",
        ),
        Category::Footwork => (
            "步法移动分析",
            "步法移动速度有所提升，但在快速变向和大范围移动时仍显不足。\
             建议增加专项体能训练和步法训练，提高移动速度和协调性。",
        ),
        Category::Serve => (
            "发球技术分析",
            "发球质量有较大提升，旋转和落点控制能力明显加强。但发球变化仍不够丰富，\
             对手容易适应。建议增加不同旋转和落点组合的发球训练，提高发球的多变性。",
        ),
    };
    Section {
        title: title.to_string(),
        content: content.to_string(),
    }
}

/// Deterministic rule-based report used whenever the external service is
/// unreachable or its output cannot be decoded. Total: always yields a
/// report with a non-empty title and at least one section.
///
/// Sections appear in fixed vocabulary order, not request order.
pub fn synthesize(categories: &[Category]) -> ReportContent {
    let mut sections: Vec<Section> = Category::ALL
        .iter()
        .filter(|c| categories.contains(c))
        .map(|&c| canned_section(c))
        .collect();

    if sections.is_empty() {
        sections.push(Section {
            title: GENERIC_SECTION_TITLE.to_string(),
            content: GENERIC_SECTION_CONTENT.to_string(),
        });
    }

    let mut conclusion = String::from("总体而言，训练效果良好，技术水平呈上升趋势。");
    if categories.contains(&Category::Forehand) {
        conclusion.push_str("正手技术是最大优势，");
    }
    if categories.contains(&Category::Backhand) {
        conclusion.push_str("反手技术和");
    }
    if categories.contains(&Category::Footwork) {
        conclusion.push_str("步法移动是需要重点提升的方向。");
    }
    conclusion.push_str("建议保持现有训练强度，并针对薄弱环节进行专项训练。");

    ReportContent {
        title: DEFAULT_TITLE.to_string(),
        summary: DEFAULT_SUMMARY.to_string(),
        sections,
        conclusion,
        suggestions: DEFAULT_SUGGESTIONS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_deterministic() {
        let a = synthesize(&[Category::Forehand]);
        let b = synthesize(&[Category::Forehand]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthesize_category_coverage_and_order() {
        // Request order is serve-first; output follows vocabulary order.
        let report = synthesize(&[Category::Serve, Category::Forehand]);
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[0].title, "正手技术分析");
        assert_eq!(report.sections[1].title, "发球技术分析");
    }

    #[test]
    fn test_synthesize_empty_categories_yields_generic_section() {
        let report = synthesize(&[]);
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].title, GENERIC_SECTION_TITLE);
        assert!(!report.title.is_empty());
    }

    #[test]
    fn test_synthesize_all_categories() {
        let report = synthesize(&Category::ALL);
        assert_eq!(report.sections.len(), 4);
        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["正手技术分析", "反手技术分析", "步法移动分析", "发球技术分析"]
        );
    }

    #[test]
    fn test_conclusion_clauses_follow_categories() {
        let base = synthesize(&[]);
        assert_eq!(
            base.conclusion,
            "总体而言，训练效果良好，技术水平呈上升趋势。建议保持现有训练强度，并针对薄弱环节进行专项训练。"
        );

        let with_forehand = synthesize(&[Category::Forehand]);
        assert!(with_forehand.conclusion.contains("正手技术是最大优势"));
        assert!(!with_forehand.conclusion.contains("反手技术和"));

        // Serve contributes a section but no conclusion clause.
        let with_serve = synthesize(&[Category::Serve]);
        assert_eq!(with_serve.conclusion, base.conclusion);
    }
}
