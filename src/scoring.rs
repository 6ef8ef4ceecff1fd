//! CLV scoring, confidence heuristic, rule-based explanations and RFM contributions

use crate::model::ClvModel;
use crate::request::PredictionRequest;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Mean absolute error used by the confidence heuristic
pub const DEFAULT_MAE: f64 = 74.0;

/// Spend above this is "high"
pub const HIGH_SPEND_THRESHOLD: f64 = 20000.0;
/// Spend above this (and not high) is "moderate"
pub const MODERATE_SPEND_THRESHOLD: f64 = 8000.0;
/// More invoices than this counts as frequent
pub const FREQUENT_INVOICE_THRESHOLD: u32 = 10;
/// Fewer days than this counts as recent
pub const RECENT_DAYS_THRESHOLD: u32 = 30;

/// Model output for a single request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Predicted customer lifetime value
    pub clv: f64,
    /// Heuristic confidence, in [0, 100], two decimals
    pub confidence_percent: f64,
}

impl PredictionResult {
    pub fn display_confidence(&self) -> u8 {
        display_confidence(self.confidence_percent)
    }
}

/// Scores requests against a shared, read-only model
#[derive(Debug, Clone)]
pub struct Scorer {
    model: Arc<ClvModel>,
    mae: f64,
}

impl Scorer {
    pub fn new(model: Arc<ClvModel>) -> Self {
        Self::with_mae(model, DEFAULT_MAE)
    }

    pub fn with_mae(model: Arc<ClvModel>, mae: f64) -> Self {
        Self { model, mae }
    }

    /// Predict the CLV of a request and derive its confidence
    pub fn score(&self, request: &PredictionRequest) -> crate::Result<PredictionResult> {
        let predictions = self.model.predict(&request.features())?;
        let clv = match predictions.get(0) {
            Some(&value) => value,
            None => anyhow::bail!("Model returned no prediction"),
        };
        let confidence_percent = confidence(clv, self.mae);

        debug!(
            recency = request.recency,
            invoice_count = request.invoice_count,
            total_spend = request.total_spend,
            clv,
            confidence_percent,
            "Scored request"
        );

        Ok(PredictionResult {
            clv,
            confidence_percent,
        })
    }
}

/// `max(0, 100 - (mae / max(p, 1)) * 100)` rounded to two decimals.
///
/// Not a calibrated interval: a fixed error is simply a smaller share of a larger estimate.
pub fn confidence(prediction: f64, mae: f64) -> f64 {
    let raw = (100.0 - (mae / prediction.max(1.0)) * 100.0).max(0.0);
    round2(raw)
}

/// Integer percentage for progress display, truncated and clamped to [0, 100]
pub fn display_confidence(confidence_percent: f64) -> u8 {
    confidence_percent.trunc().clamp(0.0, 100.0) as u8
}

/// Round on the exact decimal expansion, so binary near-halves such as
/// 99.815 (stored just below) round down to 99.81
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Canned explanation sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Explanation {
    HighSpending,
    ModerateSpending,
    LowSpending,
    FrequentPurchases,
    RecentEngagement,
}

impl Explanation {
    pub fn message(&self) -> &'static str {
        match self {
            Explanation::HighSpending => "High spending significantly increased CLV.",
            Explanation::ModerateSpending => "Moderate spending positively supported CLV.",
            Explanation::LowSpending => "Low spending reduced CLV.",
            Explanation::FrequentPurchases => "Frequent purchases boosted CLV.",
            Explanation::RecentEngagement => "Recent engagement improved CLV.",
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Explanations for a request: spend tier first, then the frequency and recency bonuses
pub fn explain(request: &PredictionRequest) -> Vec<Explanation> {
    let mut explanations = Vec::with_capacity(3);

    if request.total_spend > HIGH_SPEND_THRESHOLD {
        explanations.push(Explanation::HighSpending);
    } else if request.total_spend > MODERATE_SPEND_THRESHOLD {
        explanations.push(Explanation::ModerateSpending);
    } else {
        explanations.push(Explanation::LowSpending);
    }

    if request.invoice_count > FREQUENT_INVOICE_THRESHOLD {
        explanations.push(Explanation::FrequentPurchases);
    }

    if request.recency < RECENT_DAYS_THRESHOLD {
        explanations.push(Explanation::RecentEngagement);
    }

    explanations
}

/// RFM dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feature {
    Monetary,
    Frequency,
    Recency,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Monetary => "Monetary",
            Feature::Frequency => "Frequency",
            Feature::Recency => "Recency",
        };
        f.write_str(name)
    }
}

/// Illustrative impact score of one RFM dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: Feature,
    pub impact: f64,
}

/// Fixed-weight impact scores in Monetary, Frequency, Recency order.
/// Recency impact turns negative past 100 days.
pub fn feature_contributions(request: &PredictionRequest) -> [Contribution; 3] {
    [
        Contribution {
            feature: Feature::Monetary,
            impact: request.total_spend * 0.6 / 100.0,
        },
        Contribution {
            feature: Feature::Frequency,
            impact: f64::from(request.invoice_count) * 0.3,
        },
        Contribution {
            feature: Feature::Recency,
            impact: (100.0 - f64::from(request.recency)) * 0.1,
        },
    ]
}
