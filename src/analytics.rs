//! Illustrative analytics datasets and static overview copy.
//!
//! These are sample figures for the analytics charts. They are not derived
//! from any prediction or stored history.

/// CLV comparison bars (category, value)
pub const CLV_BENCHMARKS: [(&str, f64); 3] = [
    ("Predicted CLV", 12000.0),
    ("Average Customer CLV", 8000.0),
    ("High Value Benchmark", 18000.0),
];

/// Customer counts per value segment
pub const SEGMENT_DISTRIBUTION: [(&str, u32); 3] = [
    ("Low Value", 50),
    ("Medium Value", 35),
    ("High Value", 15),
];

/// Sample customers as (number of invoices, total spent)
pub const BEHAVIOR_SAMPLE: [(f64, f64); 5] = [
    (2.0, 2000.0),
    (5.0, 6000.0),
    (8.0, 9000.0),
    (12.0, 15000.0),
    (18.0, 25000.0),
];

pub const OVERVIEW_DESCRIPTION: &str = "Customer Lifetime Value (CLV) estimates the total revenue a business \
     can expect from a customer throughout their relationship.";

pub const KEY_FEATURES: [&str; 4] = [
    "ML-based CLV prediction",
    "Feature impact explanation",
    "Business recommendations",
    "Visual analytics",
];

pub const BUSINESS_USE_CASES: [&str; 4] = [
    "Customer segmentation",
    "Targeted marketing campaigns",
    "Retention strategy planning",
    "Revenue forecasting",
];

/// Share of each segment as a percentage of all customers
pub fn segment_shares() -> Vec<(&'static str, f64)> {
    let total: u32 = SEGMENT_DISTRIBUTION.iter().map(|(_, n)| n).sum();
    SEGMENT_DISTRIBUTION
        .iter()
        .map(|&(name, n)| (name, f64::from(n) * 100.0 / f64::from(total)))
        .collect()
}

/// Overview page as plain text
pub fn render_overview() -> String {
    let mut out = String::new();
    out.push_str("Customer Lifetime Value (CLV) Prediction System\n\n");
    out.push_str("Project Overview\n");
    out.push_str(OVERVIEW_DESCRIPTION);
    out.push_str("\n\nKey Features\n");
    for feature in KEY_FEATURES {
        out.push_str(&format!("  • {}\n", feature));
    }
    out.push_str("\nBusiness Use Cases\n");
    for use_case in BUSINESS_USE_CASES {
        out.push_str(&format!("  • {}\n", use_case));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_shares() {
        let shares = segment_shares();
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0], ("Low Value", 50.0));
        assert_eq!(shares[1], ("Medium Value", 35.0));
        assert_eq!(shares[2], ("High Value", 15.0));
    }

    #[test]
    fn test_render_overview() {
        let text = render_overview();
        assert!(text.contains("Project Overview"));
        assert!(text.contains("• Revenue forecasting"));
        assert!(text.contains("• Visual analytics"));
    }
}
