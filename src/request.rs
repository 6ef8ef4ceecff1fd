//! Prediction inputs: the three RFM features of a single customer

use ndarray::Array2;
use serde::Serialize;
use tracing::warn;

/// Number of model features, in the fixed order recency, invoice count, total spend
pub const N_FEATURES: usize = 3;

/// Canonical feature names, in model input order
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["recency", "invoice_count", "total_spend"];

/// A single customer's RFM features
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRequest {
    /// Days since last purchase
    pub recency: u32,
    /// Number of invoices
    pub invoice_count: u32,
    /// Total amount spent
    pub total_spend: f64,
}

impl PredictionRequest {
    pub fn new(recency: u32, invoice_count: u32, total_spend: f64) -> Self {
        Self::from_raw(i64::from(recency), i64::from(invoice_count), total_spend)
    }

    /// Build a request from unchecked operator input, clamping every field to its minimum
    pub fn from_raw(recency: i64, invoice_count: i64, total_spend: f64) -> Self {
        Self {
            recency: clamp_count("recency", recency),
            invoice_count: clamp_count("invoice_count", invoice_count),
            total_spend: clamp_spend(total_spend),
        }
    }

    /// Model input matrix of shape (1, 3)
    pub fn features(&self) -> Array2<f64> {
        let values = self.as_array();
        Array2::from_shape_fn((1, N_FEATURES), |(_, j)| values[j])
    }

    pub fn as_array(&self) -> [f64; N_FEATURES] {
        [
            f64::from(self.recency),
            f64::from(self.invoice_count),
            self.total_spend,
        ]
    }
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self::new(0, 0, 0.0)
    }
}

fn clamp_count(field: &str, value: i64) -> u32 {
    if value < 0 {
        warn!(field, value, "negative input clamped to 0");
        return 0;
    }
    u32::try_from(value).unwrap_or_else(|_| {
        warn!(field, value, "input clamped to u32::MAX");
        u32::MAX
    })
}

fn clamp_spend(value: f64) -> f64 {
    if value.is_nan() {
        warn!(field = "total_spend", "non-numeric spend clamped to 0.0");
        0.0
    } else if value < 0.0 {
        warn!(field = "total_spend", value, "negative spend clamped to 0.0");
        0.0
    } else if value.is_infinite() {
        warn!(field = "total_spend", "infinite spend clamped to 0.0");
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_shape_and_order() {
        let request = PredictionRequest::new(30, 10, 500.0);
        let features = request.features();

        assert_eq!(features.shape(), &[1, 3]);
        assert_eq!(features[[0, 0]], 30.0);
        assert_eq!(features[[0, 1]], 10.0);
        assert_eq!(features[[0, 2]], 500.0);
    }

    #[test]
    fn test_negative_inputs_clamp_to_zero() {
        let request = PredictionRequest::from_raw(-5, -1, -250.0);
        assert_eq!(request, PredictionRequest::new(0, 0, 0.0));
    }

    #[test]
    fn test_nan_spend_clamps_to_zero() {
        let request = PredictionRequest::from_raw(1, 2, f64::NAN);
        assert_eq!(request.total_spend, 0.0);
    }

    #[test]
    fn test_infinite_spend_clamps_to_zero() {
        assert_eq!(PredictionRequest::from_raw(1, 2, f64::INFINITY).total_spend, 0.0);
        assert_eq!(PredictionRequest::from_raw(1, 2, f64::NEG_INFINITY).total_spend, 0.0);
    }

    #[test]
    fn test_valid_inputs_untouched() {
        let request = PredictionRequest::from_raw(29, 11, 25000.5);
        assert_eq!(request.recency, 29);
        assert_eq!(request.invoice_count, 11);
        assert_eq!(request.total_spend, 25000.5);
    }
}
