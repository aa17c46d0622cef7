//! A/B experiment results

use serde::Serialize;
use uuid::Uuid;

use super::{rate, round2};
use crate::models::{AbExperiment, ExperimentStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantResult {
    pub name: String,
    pub visitors: u64,
    pub conversions: u64,
    pub conversion_rate: f64,
    /// Relative change against the control; `None` for the control itself
    pub lift: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentResults {
    pub experiment_id: Uuid,
    pub name: String,
    pub status: ExperimentStatus,
    pub total_visitors: u64,
    pub variants: Vec<VariantResult>,
    /// Highest converting variant, once anyone has visited
    pub winner: Option<String>,
}

/// The first variant is the control
pub fn experiment_results(experiment: &AbExperiment) -> ExperimentResults {
    let raw_rates: Vec<f64> = experiment
        .variants
        .iter()
        .map(|v| rate(v.conversions as f64, v.visitors as f64))
        .collect();
    let control = raw_rates.first().copied().unwrap_or(0.0);

    let variants = experiment
        .variants
        .iter()
        .zip(&raw_rates)
        .enumerate()
        .map(|(i, (variant, &r))| VariantResult {
            name: variant.name.clone(),
            visitors: variant.visitors,
            conversions: variant.conversions,
            conversion_rate: round2(r),
            lift: (i > 0).then(|| round2(rate(r - control, control))),
        })
        .collect();

    let total_visitors = experiment.variants.iter().map(|v| v.visitors).sum();

    // Ties go to the earlier variant
    let winner = if total_visitors == 0 {
        None
    } else {
        let mut best: Option<(usize, f64)> = None;
        for (i, &r) in raw_rates.iter().enumerate() {
            if best.map_or(true, |(_, top)| r > top) {
                best = Some((i, r));
            }
        }
        best.map(|(i, _)| experiment.variants[i].name.clone())
    };

    ExperimentResults {
        experiment_id: experiment.id,
        name: experiment.name.clone(),
        status: experiment.status,
        total_visitors,
        variants,
        winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Variant;
    use chrono::Utc;

    fn experiment(variants: &[(&str, u64, u64)]) -> AbExperiment {
        AbExperiment {
            id: Uuid::new_v4(),
            name: "Hero headline".to_string(),
            hypothesis: None,
            status: ExperimentStatus::Running,
            variants: variants
                .iter()
                .map(|(name, visitors, conversions)| Variant {
                    name: name.to_string(),
                    visitors: *visitors,
                    conversions: *conversions,
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_lift_and_winner() {
        let results = experiment_results(&experiment(&[
            ("control", 200, 10),
            ("bold", 200, 15),
            ("short", 100, 2),
        ]));

        assert_eq!(results.total_visitors, 500);
        assert_eq!(results.variants[0].conversion_rate, 5.0);
        assert_eq!(results.variants[0].lift, None);
        assert_eq!(results.variants[1].conversion_rate, 7.5);
        assert_eq!(results.variants[1].lift, Some(50.0));
        assert_eq!(results.variants[2].lift, Some(-60.0));
        assert_eq!(results.winner.as_deref(), Some("bold"));
    }

    #[test]
    fn test_no_visitors_no_winner() {
        let results = experiment_results(&experiment(&[("control", 0, 0), ("b", 0, 0)]));
        assert_eq!(results.winner, None);
        assert_eq!(results.variants[1].lift, Some(0.0));
        assert_eq!(results.variants[1].conversion_rate, 0.0);
    }
}
