//! Chart rendering with Plotters: feature contribution, CLV comparison,
//! segment distribution and customer behaviour

use crate::analytics::{BEHAVIOR_SAMPLE, CLV_BENCHMARKS, SEGMENT_DISTRIBUTION};
use crate::scoring::Contribution;
use plotters::element::Pie;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONTRIBUTION_CHART: &str = "feature_contribution.png";
pub const COMPARISON_CHART: &str = "clv_comparison.png";
pub const SEGMENT_CHART: &str = "segment_distribution.png";
pub const BEHAVIOR_CHART: &str = "customer_behavior.png";

/// Bar and marker color
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Pie slice colors
const SEGMENT_COLORS: [RGBColor; 3] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
];

/// Create a horizontal bar chart of RFM impact scores
///
/// # Arguments
/// * `contributions` - Impact scores, one bar per RFM dimension
/// * `output_path` - Path to save the PNG plot
///
/// # Returns
/// * Result indicating success or failure
pub fn create_contribution_chart(
    contributions: &[Contribution],
    output_path: &Path,
) -> crate::Result<()> {
    let min_impact = contributions.iter().map(|c| c.impact).fold(0.0, f64::min);
    let max_impact = contributions.iter().map(|c| c.impact).fold(0.0, f64::max);
    let span = (max_impact - min_impact).max(1.0);
    let x_range = (min_impact - span * 0.05)..(max_impact + span * 0.05);
    let n = contributions.len() as f64;

    let root = BitMapBackend::new(output_path, (600, 300)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("RFM Contribution to CLV", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range, -0.5f64..(n - 0.5))?;

    let label_for = |y: &f64| -> String {
        let idx = y.round();
        if (y - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < contributions.len() {
            contributions[idx as usize].feature.to_string()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(contributions.len())
        .y_label_formatter(&label_for)
        .x_desc("Impact Score")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(contributions.iter().enumerate().map(|(i, c)| {
        let y = i as f64;
        let (left, right) = (c.impact.min(0.0), c.impact.max(0.0));
        Rectangle::new([(left, y - 0.4), (right, y + 0.4)], BAR_COLOR.filled())
    }))?;

    root.present()?;
    info!(path = %output_path.display(), "Feature contribution chart saved");

    Ok(())
}

/// Create a bar chart of the benchmark CLV figures
///
/// # Arguments
/// * `output_path` - Path to save the PNG plot
///
/// # Returns
/// * Result indicating success or failure
pub fn create_comparison_chart(output_path: &Path) -> crate::Result<()> {
    let max_value = CLV_BENCHMARKS.iter().map(|&(_, v)| v).fold(0.0, f64::max);
    let n = CLV_BENCHMARKS.len() as f64;

    let root = BitMapBackend::new(output_path, (600, 350)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Customer CLV Comparison", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..(max_value * 1.1))?;

    let label_for = |x: &f64| -> String {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < CLV_BENCHMARKS.len() {
            CLV_BENCHMARKS[idx as usize].0.to_string()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(CLV_BENCHMARKS.len())
        .x_label_formatter(&label_for)
        .y_desc("CLV (₹)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(CLV_BENCHMARKS.iter().enumerate().map(|(i, &(_, value))| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, value)], BAR_COLOR.filled())
    }))?;

    root.present()?;
    info!(path = %output_path.display(), "CLV comparison chart saved");

    Ok(())
}

/// Create a pie chart of the customer segment distribution, starting at 90 degrees
///
/// # Arguments
/// * `output_path` - Path to save the PNG plot
///
/// # Returns
/// * Result indicating success or failure
pub fn create_segment_chart(output_path: &Path) -> crate::Result<()> {
    let sizes: Vec<f64> = SEGMENT_DISTRIBUTION.iter().map(|&(_, n)| f64::from(n)).collect();
    let labels: Vec<&str> = SEGMENT_DISTRIBUTION.iter().map(|&(name, _)| name).collect();

    let root = BitMapBackend::new(output_path, (450, 450)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Customer Segmentation by CLV", ("sans-serif", 22))?;

    let (width, height) = root.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &SEGMENT_COLORS, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
    root.draw(&pie)?;

    root.present()?;
    info!(path = %output_path.display(), "Segment distribution chart saved");

    Ok(())
}

/// Create a scatter plot of spending against purchase frequency
///
/// # Arguments
/// * `output_path` - Path to save the PNG plot
///
/// # Returns
/// * Result indicating success or failure
pub fn create_behavior_chart(output_path: &Path) -> crate::Result<()> {
    let max_invoices = BEHAVIOR_SAMPLE.iter().map(|&(x, _)| x).fold(0.0, f64::max);
    let max_spend = BEHAVIOR_SAMPLE.iter().map(|&(_, y)| y).fold(0.0, f64::max);

    let root = BitMapBackend::new(output_path, (700, 350)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Spending vs Purchase Frequency", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..(max_invoices * 1.1), 0f64..(max_spend * 1.1))?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.0))
        .bold_line_style(BLACK.mix(0.15))
        .x_desc("Number of Invoices")
        .y_desc("Total Spent (₹)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(
        BEHAVIOR_SAMPLE
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 5, BAR_COLOR.filled())),
    )?;

    root.present()?;
    info!(path = %output_path.display(), "Customer behaviour chart saved");

    Ok(())
}

/// Generate the charts shown with a prediction report
///
/// # Arguments
/// * `contributions` - RFM impact scores of the scored customer
/// * `output_dir` - Directory the PNG files are written to (created if missing)
///
/// # Returns
/// * Paths of the written charts
pub fn generate_prediction_charts(
    contributions: &[Contribution],
    output_dir: &Path,
) -> crate::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(CONTRIBUTION_CHART);
    create_contribution_chart(contributions, &path)?;
    Ok(vec![path])
}

/// Generate the analytics charts: CLV comparison, segments and behaviour
///
/// # Arguments
/// * `output_dir` - Directory the PNG files are written to (created if missing)
///
/// # Returns
/// * Paths of the written charts
pub fn generate_analytics_report(output_dir: &Path) -> crate::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let comparison = output_dir.join(COMPARISON_CHART);
    create_comparison_chart(&comparison)?;

    let segments = output_dir.join(SEGMENT_CHART);
    create_segment_chart(&segments)?;

    let behavior = output_dir.join(BEHAVIOR_CHART);
    create_behavior_chart(&behavior)?;

    Ok(vec![comparison, segments, behavior])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PredictionRequest;
    use crate::scoring::feature_contributions;
    use tempfile::tempdir;

    #[test]
    fn test_create_contribution_chart() {
        let contributions = feature_contributions(&PredictionRequest::new(150, 4, 3000.0));
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("contribution.png");

        let result = create_contribution_chart(&contributions, &output_path);
        assert!(result.is_ok());
        assert!(output_path.exists());
    }

    #[test]
    fn test_create_comparison_chart() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("comparison.png");

        assert!(create_comparison_chart(&output_path).is_ok());
        assert!(output_path.exists());
    }

    #[test]
    fn test_create_segment_chart() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("segments.png");

        assert!(create_segment_chart(&output_path).is_ok());
        assert!(output_path.exists());
    }

    #[test]
    fn test_generate_analytics_report() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("charts");

        let paths = generate_analytics_report(&output_dir).unwrap();
        assert_eq!(paths.len(), 3);
        for path in paths {
            assert!(path.exists(), "{} missing", path.display());
        }
    }
}
