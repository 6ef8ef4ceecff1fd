//! clvforge: Customer Lifetime Value prediction from RFM features
//!
//! Loads a pre-trained regression model once, scores a customer's Recency,
//! invoice count and total spend, and reports the estimate together with a
//! heuristic confidence, rule-based explanations and charts.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod request;
pub mod scoring;
pub mod viz;

// Re-export public items for easier access
pub use crate::cli::{Args, Command, PredictArgs};
pub use crate::config::AppConfig;
pub use crate::error::ModelError;
pub use crate::model::{load_model, ClvModel, ModelArtifact};
pub use crate::report::{format_currency, ClvReport, ReportFormat};
pub use crate::request::PredictionRequest;
pub use crate::scoring::{confidence, explain, feature_contributions, Explanation, PredictionResult, Scorer};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
