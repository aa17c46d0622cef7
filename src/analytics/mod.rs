//! Analytics
//!
//! Aggregation over rows that have already been fetched: campaign delivery
//! rates, event funnels, audience grouping, experiment results and form
//! volumes. Everything here is pure; handlers fetch, these functions count.
//!
//! Every percentage goes through [`rate`], so an empty denominator yields
//! `0.0` rather than `NaN` or infinity.

pub mod campaign;
pub mod experiment;
pub mod forms;
pub mod funnel;
pub mod segment;

pub use campaign::{campaign_metrics, campaign_overview, CampaignMetrics, CampaignOverview, DailyPoint, DeliveryRates, DeliveryTotals};
pub use experiment::{experiment_results, ExperimentResults, VariantResult};
pub use forms::{form_stats, FormStats};
pub use funnel::{compute_funnel, FunnelBuilder, FunnelError, FunnelReport, FunnelStep};
pub use segment::{group_by_field, segment_sizes, GroupCount, SegmentSize};

/// `numerator / denominator * 100`, or `0.0` when the denominator is zero
pub fn rate(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator * 100.0;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round to 2 decimals for presentation
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounded percentage of two counts
pub(crate) fn pct(numerator: u64, denominator: u64) -> f64 {
    round2(rate(numerator as f64, denominator as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_zero_denominator() {
        assert_eq!(rate(5.0, 0.0), 0.0);
        assert_eq!(rate(0.0, 0.0), 0.0);
        assert_eq!(pct(3, 0), 0.0);
    }

    #[test]
    fn test_rate() {
        assert_eq!(rate(25.0, 100.0), 25.0);
        assert_eq!(pct(1, 3), 33.33);
        assert_eq!(pct(2, 3), 66.67);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(-1.004), -1.0);
    }
}
