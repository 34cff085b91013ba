//! Policy parameters of the engine. These are business choices, not derived
//! values, so every one of them can be overridden by the caller.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_average, ensure_positive, EngineResult, SimulationError};

pub const DEFAULT_WEEKS_PER_MONTH: f64 = 4.0;
pub const DEFAULT_REPASSE_SHARE: f64 = 0.45;
pub const DEFAULT_MILESTONES: [f64; 6] = [1.3, 1.5, 1.7, 2.0, 2.5, 3.0];
pub const DEFAULT_REPRESENTATIVE_ROSTER: u32 = 20;
pub const DEFAULT_GUARANTEE_MONTHS: u32 = 6;
pub const DEFAULT_FILLED_REVENUE_MONTHS: u32 = 5;
pub const DEFAULT_INDIVIDUAL_TARGET_STEP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weeks_per_month: f64,
    /// Fraction of a teacher's payroll economy handed back as bonus.
    pub repasse_share: f64,
    pub bonus_milestones: Vec<f64>,
    pub representative_roster_size: u32,
    /// Length of the transition window during which income is guaranteed.
    pub guarantee_months: u32,
    /// Months of the window in which newly filled seats already bill.
    pub filled_revenue_months: u32,
    /// Maximum step above a teacher's current average for the default individual target.
    pub individual_target_step: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weeks_per_month: DEFAULT_WEEKS_PER_MONTH,
            repasse_share: DEFAULT_REPASSE_SHARE,
            bonus_milestones: DEFAULT_MILESTONES.to_vec(),
            representative_roster_size: DEFAULT_REPRESENTATIVE_ROSTER,
            guarantee_months: DEFAULT_GUARANTEE_MONTHS,
            filled_revenue_months: DEFAULT_FILLED_REVENUE_MONTHS,
            individual_target_step: DEFAULT_INDIVIDUAL_TARGET_STEP,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        ensure_positive("weeks_per_month", self.weeks_per_month)?;
        validate_repasse_share(self.repasse_share)?;
        if self.bonus_milestones.is_empty() {
            return Err(SimulationError::invalid(
                "bonus_milestones",
                "at least one milestone is required",
            ));
        }
        for (index, milestone) in self.bonus_milestones.iter().enumerate() {
            ensure_average(&format!("bonus_milestones[{index}]"), *milestone)?;
        }
        if self.representative_roster_size == 0 {
            return Err(SimulationError::invalid(
                "representative_roster_size",
                "must be > 0",
            ));
        }
        self.guarantee_window()?;
        ensure_positive("individual_target_step", self.individual_target_step)?;
        Ok(())
    }

    pub fn guarantee_window(&self) -> EngineResult<GuaranteeWindow> {
        GuaranteeWindow::new(self.guarantee_months, self.filled_revenue_months)
    }
}

pub(crate) fn validate_repasse_share(share: f64) -> EngineResult<f64> {
    if !(0.0..=1.0).contains(&share) {
        return Err(SimulationError::invalid(
            "repasse_share",
            format!("must be within [0, 1], got {share}"),
        ));
    }
    Ok(share)
}

/// Transition window of the guarantee model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteeWindow {
    pub months: u32,
    pub filled_revenue_months: u32,
}

impl GuaranteeWindow {
    pub fn new(months: u32, filled_revenue_months: u32) -> EngineResult<Self> {
        if months == 0 {
            return Err(SimulationError::invalid("guarantee_months", "must be > 0"));
        }
        if filled_revenue_months > months {
            return Err(SimulationError::invalid(
                "filled_revenue_months",
                format!("cannot exceed the {months}-month guarantee window"),
            ));
        }
        Ok(Self {
            months,
            filled_revenue_months,
        })
    }
}

impl Default for GuaranteeWindow {
    fn default() -> Self {
        Self {
            months: DEFAULT_GUARANTEE_MONTHS,
            filled_revenue_months: DEFAULT_FILLED_REVENUE_MONTHS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn repasse_share_must_be_a_fraction() {
        let config = EngineConfig {
            repasse_share: 1.5,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), "repasse_share");
    }

    #[test]
    fn milestones_below_one_are_rejected() {
        let config = EngineConfig {
            bonus_milestones: vec![1.5, 0.8],
            ..EngineConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), "bonus_milestones[1]");
    }

    #[test]
    fn revenue_months_fit_inside_window() {
        assert!(GuaranteeWindow::new(6, 7).is_err());
        assert!(GuaranteeWindow::new(0, 0).is_err());
        assert_eq!(GuaranteeWindow::new(6, 5).unwrap(), GuaranteeWindow::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"repasse_share": 0.5}"#).unwrap();
        assert_eq!(config.repasse_share, 0.5);
        assert_eq!(config.weeks_per_month, DEFAULT_WEEKS_PER_MONTH);
    }
}
