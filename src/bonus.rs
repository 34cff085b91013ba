//! Bonus schedule: how much of a representative teacher's payroll economy
//! goes back to the teacher at each milestone average.

use serde::{Deserialize, Serialize};

use crate::config::{validate_repasse_share, EngineConfig};
use crate::cost;
use crate::error::{ensure_average, EngineResult, SimulationError};
use crate::scenario::CompensationScenario;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusScheduleEntry {
    pub target_average: f64,
    pub monthly_savings: f64,
    pub suggested_bonus: f64,
    pub school_profit: f64,
    pub repasse_percent: f64,
}

pub fn generate_bonus_schedule(
    roster_size: u32,
    current_average: f64,
    milestones: &[f64],
    scenario: &CompensationScenario,
    repasse_share: f64,
    weeks_per_month: f64,
) -> EngineResult<Vec<BonusScheduleEntry>> {
    if roster_size == 0 {
        return Err(SimulationError::invalid("roster_size", "must be > 0"));
    }
    ensure_average("current_average", current_average)?;
    validate_repasse_share(repasse_share)?;
    scenario.validate()?;

    let students = f64::from(roster_size);
    let current_payroll = cost::payroll_for(students, current_average, scenario, weeks_per_month)?;

    milestones
        .iter()
        .enumerate()
        .map(|(index, &milestone)| {
            ensure_average(&format!("milestones[{index}]"), milestone)?;
            let milestone_payroll =
                cost::payroll_for(students, milestone, scenario, weeks_per_month)?;
            Ok(schedule_entry(
                milestone,
                current_payroll - milestone_payroll,
                repasse_share,
            ))
        })
        .collect()
}

/// Schedule for the configured representative roster and milestones.
pub fn default_bonus_schedule(
    current_average: f64,
    scenario: &CompensationScenario,
    config: &EngineConfig,
) -> EngineResult<Vec<BonusScheduleEntry>> {
    config.validate()?;
    generate_bonus_schedule(
        config.representative_roster_size,
        current_average,
        &config.bonus_milestones,
        scenario,
        config.repasse_share,
        config.weeks_per_month,
    )
}

fn schedule_entry(target_average: f64, economy: f64, repasse_share: f64) -> BonusScheduleEntry {
    // No economy, no bonus: losses are not shared.
    let suggested_bonus = if economy > 0.0 {
        economy * repasse_share
    } else {
        0.0
    };
    let repasse_percent = if economy > 0.0 {
        suggested_bonus / economy * 100.0
    } else {
        0.0
    };
    BonusScheduleEntry {
        target_average,
        monthly_savings: economy,
        suggested_bonus,
        school_profit: economy - suggested_bonus,
        repasse_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MILESTONES;
    use crate::scenario::ScenarioPreset;

    fn schedule(current: f64, milestones: &[f64]) -> Vec<BonusScheduleEntry> {
        generate_bonus_schedule(
            20,
            current,
            milestones,
            &ScenarioPreset::Current.scenario(),
            0.45,
            4.0,
        )
        .unwrap()
    }

    #[test]
    fn one_row_per_milestone() {
        let rows = schedule(1.2, &DEFAULT_MILESTONES);
        assert_eq!(rows.len(), DEFAULT_MILESTONES.len());
        assert_eq!(rows[3].target_average, 2.0);
    }

    #[test]
    fn splits_economy_between_teacher_and_school() {
        let rows = schedule(1.0, &[2.0]);
        let row = &rows[0];
        // 2800 at one per class vs 1800 at two per class
        assert!((row.monthly_savings - 1_000.0).abs() < 1e-9);
        assert!((row.suggested_bonus - 450.0).abs() < 1e-9);
        assert!((row.school_profit - 550.0).abs() < 1e-9);
        assert!((row.repasse_percent - 45.0).abs() < 1e-9);
    }

    #[test]
    fn no_economy_means_zero_repasse() {
        let rows = schedule(2.0, &[2.0, 1.5]);
        for row in rows {
            assert!(row.monthly_savings <= 0.0);
            assert_eq!(row.suggested_bonus, 0.0);
            assert_eq!(row.repasse_percent, 0.0);
            assert_eq!(row.school_profit, row.monthly_savings);
        }
    }

    #[test]
    fn empty_roster_is_rejected() {
        let err = generate_bonus_schedule(
            0,
            1.5,
            &DEFAULT_MILESTONES,
            &ScenarioPreset::Current.scenario(),
            0.45,
            4.0,
        )
        .unwrap_err();
        assert_eq!(err.field(), "roster_size");
    }

    #[test]
    fn default_schedule_uses_config() {
        let config = EngineConfig {
            bonus_milestones: vec![1.5, 2.0],
            ..EngineConfig::default()
        };
        let rows =
            default_bonus_schedule(1.2, &ScenarioPreset::Moderate.scenario(), &config).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].monthly_savings > rows[0].monthly_savings);
    }
}
