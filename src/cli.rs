//! Command-line interface definitions and argument parsing

use crate::report::ReportFormat;
use crate::request::PredictionRequest;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Customer Lifetime Value prediction from RFM features
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (TOML); defaults to config/clvforge.toml if present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the JSON model artifact, overriding the configuration
    #[arg(short, long, global = true)]
    pub model: Option<PathBuf>,

    /// Directory for rendered charts, overriding the configuration
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the project overview
    Overview,
    /// Generate a CLV report for one customer
    Predict(PredictArgs),
    /// Render the analytics and insights charts
    Analytics,
}

#[derive(ClapArgs, Debug, Default)]
pub struct PredictArgs {
    /// Days since last purchase
    #[arg(short, long, conflicts_with = "rfm", allow_negative_numbers = true)]
    pub recency: Option<i64>,

    /// Number of invoices
    #[arg(short, long, conflicts_with = "rfm", allow_negative_numbers = true)]
    pub invoices: Option<i64>,

    /// Total spent amount
    #[arg(short, long, conflicts_with = "rfm", allow_negative_numbers = true)]
    pub spend: Option<f64>,

    /// R,F,M values as comma-separated string
    /// Example: --rfm "30,10,500.0" for Recency=30, Invoices=10, Spend=500.0
    #[arg(long, allow_hyphen_values = true)]
    pub rfm: Option<String>,

    /// Report output format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Skip rendering the feature contribution chart
    #[arg(long)]
    pub no_charts: bool,
}

impl PredictArgs {
    /// Build the prediction request; missing fields take their minimum (0)
    pub fn to_request(&self) -> crate::Result<PredictionRequest> {
        if let Some(rfm) = self.parse_rfm_values()? {
            let (recency, invoices, spend) = rfm;
            return Ok(PredictionRequest::from_raw(recency, invoices, spend));
        }

        Ok(PredictionRequest::from_raw(
            self.recency.unwrap_or(0),
            self.invoices.unwrap_or(0),
            self.spend.unwrap_or(0.0),
        ))
    }

    /// Parse RFM values from the rfm string
    /// Expected format: "recency,invoices,spend"
    pub fn parse_rfm_values(&self) -> crate::Result<Option<(i64, i64, f64)>> {
        let Some(ref rfm_str) = self.rfm else {
            return Ok(None);
        };

        let parts: Vec<&str> = rfm_str.split(',').collect();
        if parts.len() != 3 {
            anyhow::bail!("RFM values must be in format 'recency,invoices,spend'");
        }

        let recency: i64 = parts[0]
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid recency value: {}", parts[0]))?;
        let invoices: i64 = parts[1]
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid invoice count: {}", parts[1]))?;
        let spend: f64 = parts[2]
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid spend value: {}", parts[2]))?;

        Ok(Some((recency, invoices, spend)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfm_values() {
        let mut args = PredictArgs {
            rfm: Some("30,10,500.0".to_string()),
            ..Default::default()
        };

        let result = args.parse_rfm_values().unwrap();
        assert_eq!(result, Some((30, 10, 500.0)));

        args.rfm = None;
        let result = args.parse_rfm_values().unwrap();
        assert_eq!(result, None);

        args.rfm = Some("invalid".to_string());
        assert!(args.parse_rfm_values().is_err());

        args.rfm = Some("30,ten,500".to_string());
        assert!(args.parse_rfm_values().is_err());
    }

    #[test]
    fn test_to_request_defaults_and_clamps() {
        let args = PredictArgs::default();
        assert_eq!(args.to_request().unwrap(), PredictionRequest::new(0, 0, 0.0));

        let args = PredictArgs {
            recency: Some(-3),
            invoices: Some(12),
            spend: Some(-10.0),
            ..Default::default()
        };
        assert_eq!(args.to_request().unwrap(), PredictionRequest::new(0, 12, 0.0));
    }

    #[test]
    fn test_parse_predict_command() {
        let args = Args::try_parse_from([
            "clvforge",
            "--model",
            "m.json",
            "predict",
            "--recency",
            "29",
            "--invoices",
            "11",
            "--spend",
            "25000",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.model, Some(PathBuf::from("m.json")));
        match args.command {
            Command::Predict(predict) => {
                assert_eq!(predict.format, ReportFormat::Json);
                assert_eq!(
                    predict.to_request().unwrap(),
                    PredictionRequest::new(29, 11, 25000.0)
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_negative_rfm_reaches_clamping() {
        let args = Args::try_parse_from(["clvforge", "predict", "--rfm", "-5,-2,-10"]).unwrap();

        match args.command {
            Command::Predict(predict) => {
                assert_eq!(predict.rfm.as_deref(), Some("-5,-2,-10"));
                assert_eq!(
                    predict.to_request().unwrap(),
                    PredictionRequest::new(0, 0, 0.0)
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rfm_conflicts_with_fields() {
        let result = Args::try_parse_from([
            "clvforge", "predict", "--rfm", "1,2,3", "--recency", "5",
        ]);
        assert!(result.is_err());
    }
}
