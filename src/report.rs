use crate::models::{AnalysisResult, SentimentSummary, Subject};

/// Pretty-printed summary object; falls back to compact JSON if pretty printing fails.
pub fn summary_dump(result: &AnalysisResult) -> String {
    serde_json::to_string_pretty(&result.summary).unwrap_or_else(|_| result.summary.to_string())
}

/// Plain-text rendering used for the clipboard and the headless command.
pub fn render_text_report(subject: Subject, result: &AnalysisResult, api_base: &str) -> String {
    let mut out = format!("Feedback analysis: {}\n\n", subject);

    out.push_str("Summary\n");
    if let Some(view) = SentimentSummary::from_summary(&result.summary) {
        out.push_str(&view.headline());
        out.push('\n');
    }
    out.push_str(&summary_dump(result));
    out.push_str("\n\nInterpretations\n");
    if result.interpretations.is_empty() {
        out.push_str("(none)\n");
    }
    for line in &result.interpretations {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("\nWordcloud\n");
    out.push_str(&result.resolved_wordcloud_url(api_base));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_text_report() {
        let result = AnalysisResult {
            summary: json!({"count": 1, "mean": 0.5}),
            interpretations: vec!["Overall mean polarity: 0.500".into()],
            wordcloud_url: "/media/wc_AI.png".into(),
        };
        let report = render_text_report(Subject::ArtificialIntelligence, &result, "http://localhost:8000");
        assert_eq!(
            report,
            "Feedback analysis: Artificial Intelligence\n\n\
             Summary\n\
             1 comment · mean polarity 0.500\n\
             {\n  \"count\": 1,\n  \"mean\": 0.5\n}\n\n\
             Interpretations\n\
             - Overall mean polarity: 0.500\n\n\
             Wordcloud\n\
             http://localhost:8000/media/wc_AI.png\n"
        );
    }

    #[test]
    fn test_text_report_without_interpretations() {
        let result = AnalysisResult {
            summary: json!({"topics": []}),
            interpretations: vec![],
            wordcloud_url: "https://cdn.example.org/wc.png".into(),
        };
        let report = render_text_report(Subject::OptimizationTechniques, &result, "http://localhost:8000");
        assert!(report.contains("Interpretations\n(none)\n"));
        assert!(report.ends_with("https://cdn.example.org/wc.png\n"));
        assert!(!report.contains("mean polarity"));
    }
}
