//! Markdown report written by `stock-analyst analyze --output`

use crate::store::AnalysisResult;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// Shown under every result
pub const DISCLAIMER: &str = "This analysis is for educational purposes only. \
Always consult with a financial advisor before making investment decisions.";

/// The downloadable report for `result`
pub fn render_markdown(result: &AnalysisResult) -> String {
    format!(
        "# Stock Analysis Report\n\n\
         **Request:** {}\n\n\
         **Generated:** {}\n\n\
         ---\n\n\
         {}\n\n\
         ---\n\n\
         *Disclaimer: {}*\n",
        result.request,
        result.timestamp.format("%Y-%m-%d %H:%M UTC"),
        result.result_text.trim_end(),
        DISCLAIMER
    )
}

/// `{uuid}_{YYYYmmdd_HHMM}.md`
pub fn report_file_name(now: DateTime<Local>) -> String {
    format!("{}_{}.md", Uuid::new_v4(), now.format("%Y%m%d_%H%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_markdown() {
        let result = AnalysisResult {
            request: "Should I invest in MSFT?".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
            result_text: "## Recommendation\nHOLD\n".into(),
        };
        let markdown = render_markdown(&result);

        assert!(markdown.starts_with("# Stock Analysis Report\n"));
        assert!(markdown.contains("**Request:** Should I invest in MSFT?"));
        assert!(markdown.contains("**Generated:** 2025-03-14 09:30 UTC"));
        assert!(markdown.contains("## Recommendation\nHOLD\n\n---"));
        assert!(markdown.contains("educational purposes only"));
    }

    #[test]
    fn test_report_file_name() {
        let now = Local.with_ymd_and_hms(2025, 3, 14, 9, 5, 0).unwrap();
        let name = report_file_name(now);

        let (id, stamp) = name.split_once('_').unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(stamp, "20250314_0905.md");
    }
}
