//! Income guarantee while a teacher's classes consolidate toward a higher
//! average.
//!
//! Consolidating classes lowers the teacher's pay before the freed seats are
//! refilled. The school tops the teacher up to their previous earnings for the
//! transition window; this module projects what that costs in the pessimistic
//! case (no new students) and in the optimistic one (freed seats sell quickly).

use serde::{Deserialize, Serialize};

use crate::config::GuaranteeWindow;
use crate::cost;
use crate::error::{ensure_average, ensure_finite, ensure_positive, EngineResult, SimulationError};
use crate::scenario::CompensationScenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    BreakEven,
    Gain,
    Loss,
}

impl TransitionOutcome {
    fn of(net: f64) -> Self {
        if net > 0.0 {
            Self::Gain
        } else if net < 0.0 {
            Self::Loss
        } else {
            Self::BreakEven
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BreakEven => "break-even",
            Self::Gain => "gain",
            Self::Loss => "loss",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeProjection {
    pub students_per_teacher: u32,
    pub current_average: f64,
    pub target_average: f64,
    pub earnings_at_current: f64,
    pub earnings_at_target: f64,
    /// Monthly top-up owed to the teacher; only owed when positive.
    pub guarantee_gap: f64,
    pub guarantee_owed: bool,
    pub window: GuaranteeWindow,
    pub pessimistic_total_guarantee: f64,
    pub pessimistic_outcome: TransitionOutcome,
    pub new_students_filled: u32,
    pub optimistic_new_revenue: f64,
    pub optimistic_net_outcome: f64,
    pub optimistic_outcome: TransitionOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuaranteeTransition {
    Projected(GuaranteeProjection),
    NotApplicable { reason: String },
}

pub fn project_guarantee_transition(
    students_per_teacher: u32,
    current_average: f64,
    target_average: f64,
    scenario: &CompensationScenario,
    ticket_price: f64,
    weeks_per_month: f64,
    window: GuaranteeWindow,
) -> EngineResult<GuaranteeTransition> {
    if students_per_teacher == 0 {
        return Err(SimulationError::invalid(
            "students_per_teacher",
            "must be > 0",
        ));
    }
    if ensure_finite("current_average", current_average)? == 0.0 {
        return Ok(GuaranteeTransition::NotApplicable {
            reason: "teacher has no current classes to transition from".to_string(),
        });
    }
    ensure_average("current_average", current_average)?;
    ensure_average("target_average", target_average)?;
    ensure_positive("ticket_price", ticket_price)?;
    scenario.validate()?;
    let window = GuaranteeWindow::new(window.months, window.filled_revenue_months)?;

    let students = f64::from(students_per_teacher);
    let earnings_at_current =
        cost::payroll_for(students, current_average, scenario, weeks_per_month)?;
    let earnings_at_target =
        cost::payroll_for(students, target_average, scenario, weeks_per_month)?;
    let guarantee_gap = earnings_at_current - earnings_at_target;
    let monthly_guarantee = guarantee_gap.max(0.0);

    let pessimistic_total_guarantee = monthly_guarantee * f64::from(window.months);

    let new_students_filled = seats_freed(students, target_average);
    let optimistic_new_revenue =
        f64::from(new_students_filled) * ticket_price * f64::from(window.filled_revenue_months);
    // Seats fill after the first month, so only one month of guarantee is paid.
    let optimistic_net_outcome = optimistic_new_revenue - monthly_guarantee;

    if guarantee_gap > 0.0 {
        tracing::debug!(
            guarantee_gap,
            pessimistic_total_guarantee,
            optimistic_net_outcome,
            "projected guarantee transition"
        );
    }

    Ok(GuaranteeTransition::Projected(GuaranteeProjection {
        students_per_teacher,
        current_average,
        target_average,
        earnings_at_current,
        earnings_at_target,
        guarantee_gap,
        guarantee_owed: guarantee_gap > 0.0,
        window,
        pessimistic_total_guarantee,
        pessimistic_outcome: TransitionOutcome::BreakEven,
        new_students_filled,
        optimistic_new_revenue,
        optimistic_net_outcome,
        optimistic_outcome: TransitionOutcome::of(optimistic_net_outcome),
    }))
}

/// `ceil(students * (target - 1) / target)`, ignoring float noise just above
/// an integer.
fn seats_freed(students: f64, target_average: f64) -> u32 {
    let freed = students * (target_average - 1.0) / target_average;
    (freed - 1e-9).ceil().max(0.0) as u32
}
