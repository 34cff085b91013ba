//! Scores how sound a proposed target average is and explains why.

use serde::{Deserialize, Serialize};

pub const MAX_REALISTIC_AVERAGE: f64 = 3.0;
pub const MIN_AVERAGE: f64 = 1.0;
pub const LOW_IMPACT_GAIN: f64 = 0.2;

const ERROR_PENALTY: u32 = 40;
const WARNING_PENALTY: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Error,
    Warning,
    Success,
}

impl AlertKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViabilityAlert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl ViabilityAlert {
    fn new(kind: AlertKind, title: &str, message: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViabilityInput {
    pub current_average: f64,
    pub target_average: f64,
    pub margin_at_current: f64,
    pub margin_at_target: f64,
    pub monthly_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViabilityAssessment {
    pub score: u8,
    pub alerts: Vec<ViabilityAlert>,
}

/// Evaluates the fixed rule set. Alerts come out errors first, then warnings,
/// and a single success alert only when nothing else fired.
pub fn assess(input: &ViabilityInput) -> ViabilityAssessment {
    let mut alerts = Vec::new();
    let average_gain = round_gain(input.target_average - input.current_average);
    let margin_gain = input.margin_at_target - input.margin_at_current;

    if input.target_average < input.current_average {
        alerts.push(ViabilityAlert::new(
            AlertKind::Error,
            "Unrealistic target",
            format!(
                "Moving from {:.2} to {:.2} students per class reduces gross margin by {:.1} points.",
                input.current_average,
                input.target_average,
                -margin_gain
            ),
        ));
    } else if input.target_average > MAX_REALISTIC_AVERAGE || input.target_average < MIN_AVERAGE {
        alerts.push(ViabilityAlert::new(
            AlertKind::Error,
            "Unrealistic target",
            format!(
                "A target of {:.2} students per class is outside the achievable range of {:.1} to {:.1}.",
                input.target_average, MIN_AVERAGE, MAX_REALISTIC_AVERAGE
            ),
        ));
    }

    if input.margin_at_target < 0.0 {
        alerts.push(ViabilityAlert::new(
            AlertKind::Error,
            "Negative margin",
            format!(
                "Payroll exceeds revenue at the target: gross margin would be {:.1}%.",
                input.margin_at_target
            ),
        ));
    }

    if (0.0..LOW_IMPACT_GAIN).contains(&average_gain) {
        alerts.push(ViabilityAlert::new(
            AlertKind::Warning,
            "Low impact",
            format!(
                "Raising the average by {average_gain:.2} students per class barely moves the margin ({margin_gain:.1} points)."
            ),
        ));
    }

    if alerts.is_empty() {
        alerts.push(ViabilityAlert::new(
            AlertKind::Success,
            "Viable target",
            format!(
                "Gross margin improves by {:.1} points, saving {:.2} per month.",
                margin_gain, input.monthly_savings
            ),
        ));
    }

    alerts.sort_by_key(|alert| alert.kind);
    let score = score_alerts(&alerts);
    ViabilityAssessment { score, alerts }
}

pub fn score_alerts(alerts: &[ViabilityAlert]) -> u8 {
    let penalty: u32 = alerts
        .iter()
        .map(|alert| match alert.kind {
            AlertKind::Error => ERROR_PENALTY,
            AlertKind::Warning => WARNING_PENALTY,
            AlertKind::Success => 0,
        })
        .sum();
    100u32.saturating_sub(penalty) as u8
}

/// Drops float noise so a gain that reads as 0.20 is not treated as 0.1999...
fn round_gain(gain: f64) -> f64 {
    (gain * 1e9).round() / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(current: f64, target: f64, margin_current: f64, margin_target: f64) -> ViabilityInput {
        ViabilityInput {
            current_average: current,
            target_average: target,
            margin_at_current: margin_current,
            margin_at_target: margin_target,
            monthly_savings: 1_000.0,
        }
    }

    #[test]
    fn healthy_target_scores_full_marks() {
        let result = assess(&input(1.5, 2.0, 73.0, 78.5));
        assert_eq!(result.score, 100);
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].kind, AlertKind::Success);
        assert!(result.alerts[0].message.contains("5.5 points"));
    }

    #[test]
    fn backwards_target_is_an_error() {
        let result = assess(&input(1.8, 1.5, 77.0, 73.0));
        assert_eq!(result.alerts[0].kind, AlertKind::Error);
        assert!(result.alerts[0].message.contains("reduces gross margin"));
        assert_eq!(result.score, 60);
    }

    #[test]
    fn target_above_ceiling_is_an_error() {
        let result = assess(&input(2.0, 3.5, 78.5, 82.0));
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].title, "Unrealistic target");
        assert_eq!(result.score, 60);
    }

    #[test]
    fn small_gain_warns() {
        let result = assess(&input(1.5, 1.6, 73.0, 74.0));
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].kind, AlertKind::Warning);
        assert_eq!(result.score, 85);
    }

    #[test]
    fn gain_of_exactly_point_two_is_not_low_impact() {
        let result = assess(&input(1.5, 1.7, 73.0, 75.0));
        assert_eq!(result.alerts[0].kind, AlertKind::Success);
    }

    #[test]
    fn unchanged_target_warns_low_impact() {
        let result = assess(&input(2.0, 2.0, 78.5, 78.5));
        assert_eq!(result.alerts[0].title, "Low impact");
    }

    #[test]
    fn errors_come_before_warnings() {
        let result = assess(&input(1.2, 1.3, -12.0, -5.0));
        let kinds: Vec<AlertKind> = result.alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Error, AlertKind::Warning]);
        assert_eq!(result.score, 45);
    }

    #[test]
    fn score_floors_at_zero() {
        let alerts: Vec<ViabilityAlert> = (0..3)
            .map(|_| ViabilityAlert::new(AlertKind::Error, "x", String::new()))
            .collect();
        assert_eq!(score_alerts(&alerts), 0);
    }
}
