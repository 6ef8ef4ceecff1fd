//! CLV report assembly and rendering (text and JSON)

use crate::request::PredictionRequest;
use crate::scoring::{explain, feature_contributions, Contribution, Explanation, PredictionResult, Scorer};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write as _;

const CURRENCY_SYMBOL: &str = "₹";
const PROGRESS_WIDTH: usize = 20;

/// Output format for the prediction report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Everything shown for a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct ClvReport {
    pub request: PredictionRequest,
    pub result: PredictionResult,
    pub explanations: Vec<Explanation>,
    pub contributions: [Contribution; 3],
    pub generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    request: &'a PredictionRequest,
    clv: f64,
    clv_display: String,
    confidence_percent: f64,
    display_confidence: u8,
    explanations: Vec<&'static str>,
    contributions: &'a [Contribution; 3],
}

impl ClvReport {
    /// Score a request and gather its explanations and contributions
    pub fn generate(scorer: &Scorer, request: PredictionRequest) -> crate::Result<Self> {
        let result = scorer.score(&request)?;
        Ok(Self {
            request,
            result,
            explanations: explain(&request),
            contributions: feature_contributions(&request),
            generated_at: Utc::now(),
        })
    }

    pub fn clv_display(&self) -> String {
        format_currency(self.result.clv)
    }

    pub fn render(&self, format: ReportFormat) -> crate::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.render_json(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let display = self.result.display_confidence();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "Customer Lifetime Value Report");
        let _ = writeln!(out, "==============================");
        let _ = writeln!(
            out,
            "Input: recency={} days, invoices={}, total spent={}",
            self.request.recency,
            self.request.invoice_count,
            format_currency(self.request.total_spend)
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Predicted CLV: {}", self.clv_display());
        let _ = writeln!(out, "Confidence:    {}", progress_bar(display));
        let _ = writeln!(out);
        let _ = writeln!(out, "Feature Impact Explanation");
        for explanation in &self.explanations {
            let _ = writeln!(out, "  • {}", explanation);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Feature Contribution to CLV");
        for contribution in &self.contributions {
            let _ = writeln!(
                out,
                "  {:<10} {:>10.2}",
                contribution.feature.to_string(),
                contribution.impact
            );
        }
        out
    }

    pub fn render_json(&self) -> crate::Result<String> {
        let report = JsonReport {
            generated_at: self.generated_at.to_rfc3339(),
            request: &self.request,
            clv: self.result.clv,
            clv_display: self.clv_display(),
            confidence_percent: self.result.confidence_percent,
            display_confidence: self.result.display_confidence(),
            explanations: self.explanations.iter().map(Explanation::message).collect(),
            contributions: &self.contributions,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

/// Currency string with no decimals and comma thousands separators, e.g. `₹ 12,000`
pub fn format_currency(value: f64) -> String {
    format!("{} {}", CURRENCY_SYMBOL, group_thousands(&format!("{:.0}", value)))
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

/// Text progress bar like `[###################-]  99%`
pub fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100);
    let filled = usize::from(percent) * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClvModel, ModelArtifact};
    use std::sync::Arc;

    fn scorer() -> Scorer {
        let model = ClvModel::from_artifact(ModelArtifact::Linear {
            intercept: 0.0,
            coefficients: vec![0.0, 0.0, 1.0],
        })
        .unwrap();
        Scorer::new(Arc::new(model))
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(12000.0), "₹ 12,000");
        assert_eq!(format_currency(999.0), "₹ 999");
        assert_eq!(format_currency(1234567.4), "₹ 1,234,567");
        assert_eq!(format_currency(100000.6), "₹ 100,001");
        assert_eq!(format_currency(-1500.0), "₹ -1,500");
        assert_eq!(format_currency(0.0), "₹ 0");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(99), format!("[{}-]  99%", "#".repeat(19)));
        assert_eq!(progress_bar(0), format!("[{}]   0%", "-".repeat(20)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(20)));
    }

    #[test]
    fn test_generate_report() {
        let request = PredictionRequest::new(29, 11, 25000.0);
        let report = ClvReport::generate(&scorer(), request).unwrap();

        assert_eq!(report.result.clv, 25000.0);
        assert_eq!(report.clv_display(), "₹ 25,000");
        assert_eq!(
            report.explanations,
            vec![
                Explanation::HighSpending,
                Explanation::FrequentPurchases,
                Explanation::RecentEngagement,
            ]
        );

        let text = report.render_text();
        assert!(text.contains("Predicted CLV: ₹ 25,000"));
        assert!(text.contains("• High spending significantly increased CLV."));
        assert!(text.contains("Monetary"));
    }

    #[test]
    fn test_render_json() {
        let request = PredictionRequest::new(40, 3, 12000.0);
        let report = ClvReport::generate(&scorer(), request).unwrap();

        let json = report.render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["clv"], 12000.0);
        assert_eq!(value["clv_display"], "₹ 12,000");
        assert_eq!(value["confidence_percent"], 99.38);
        assert_eq!(value["display_confidence"], 99);
        assert_eq!(value["request"]["invoice_count"], 3);
        assert_eq!(value["explanations"][0], "Moderate spending positively supported CLV.");
        assert_eq!(value["contributions"][0]["feature"], "Monetary");
    }
}
