//! Payroll cost of a class under escalating compensation.
//!
//! This is the only place the escalation rule lives. Everything else in the
//! engine derives class, teacher and unit payroll from these functions.

use crate::error::{ensure_average, ensure_positive, EngineResult};
use crate::scenario::CompensationScenario;

/// Monthly pay for one class with `average` students:
/// `(base_pay + increment * (average - 1)) * weeks_per_month`.
pub fn monthly_cost_per_class(
    average: f64,
    scenario: &CompensationScenario,
    weeks_per_month: f64,
) -> EngineResult<f64> {
    let average = ensure_average("average", average)?;
    let weeks_per_month = ensure_positive("weeks_per_month", weeks_per_month)?;
    Ok((scenario.base_pay + scenario.increment * (average - 1.0)) * weeks_per_month)
}

/// Monthly payroll attributable to each student. Strictly decreasing in
/// `average` whenever `increment > 0`, approaching `increment * weeks_per_month`.
pub fn cost_per_student(
    average: f64,
    scenario: &CompensationScenario,
    weeks_per_month: f64,
) -> EngineResult<f64> {
    Ok(monthly_cost_per_class(average, scenario, weeks_per_month)? / average)
}

/// Number of classes needed to seat `students` at `average` per class.
pub fn classes_for(students: f64, average: f64) -> f64 {
    students / average
}

/// Monthly payroll for `students` seated at `average` per class.
pub fn payroll_for(
    students: f64,
    average: f64,
    scenario: &CompensationScenario,
    weeks_per_month: f64,
) -> EngineResult<f64> {
    Ok(monthly_cost_per_class(average, scenario, weeks_per_month)? * classes_for(students, average))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioPreset;

    fn current() -> CompensationScenario {
        ScenarioPreset::Current.scenario()
    }

    #[test]
    fn single_student_class_costs_base_pay() {
        assert_eq!(monthly_cost_per_class(1.0, &current(), 4.0).unwrap(), 140.0);
        assert_eq!(cost_per_student(1.0, &current(), 4.0).unwrap(), 140.0);
    }

    #[test]
    fn two_student_class_amortises_base_pay() {
        assert_eq!(monthly_cost_per_class(2.0, &current(), 4.0).unwrap(), 180.0);
        assert_eq!(cost_per_student(2.0, &current(), 4.0).unwrap(), 90.0);
    }

    #[test]
    fn cost_per_student_trends_to_increment() {
        let far = cost_per_student(1_000.0, &current(), 4.0).unwrap();
        assert!(far > 40.0);
        assert!(far - 40.0 < 0.2);
    }

    #[test]
    fn rejects_averages_below_one() {
        let err = monthly_cost_per_class(0.5, &current(), 4.0).unwrap_err();
        assert_eq!(err.field(), "average");
    }

    #[test]
    fn rejects_non_positive_weeks() {
        let err = cost_per_student(1.5, &current(), 0.0).unwrap_err();
        assert_eq!(err.field(), "weeks_per_month");
    }

    #[test]
    fn payroll_scales_with_students() {
        let payroll = payroll_for(100.0, 2.0, &current(), 4.0).unwrap();
        assert!((payroll - 9_000.0).abs() < 1e-9);
    }
}
