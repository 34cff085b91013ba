use classroom_profitability::bonus::generate_bonus_schedule;
use classroom_profitability::cost::{cost_per_student, monthly_cost_per_class};
use classroom_profitability::margin::{gross_margin, payroll_percent};
use classroom_profitability::scenario::{CompensationScenario, ScenarioChoice};
use classroom_profitability::simulation::{simulate, SimulationInputs};
use classroom_profitability::viability::AlertKind;
use proptest::prelude::*;

fn scenario(base_pay: f64, increment: f64) -> CompensationScenario {
    CompensationScenario::new("prop", "Property scenario", base_pay, increment).unwrap()
}

proptest! {
    #[test]
    fn payroll_and_margin_sum_to_hundred(
        average in 1.0f64..3.0,
        base in 0.0f64..200.0,
        increment in 0.0f64..50.0,
        price in 1.0f64..2_000.0,
    ) {
        let cps = cost_per_student(average, &scenario(base, increment), 4.0).unwrap();
        let percent = payroll_percent(cps, price);
        prop_assert!((percent + gross_margin(percent) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cost_per_student_falls_as_classes_fill(
        increment in 0.1f64..50.0,
        extra_base in 0.1f64..150.0,
        low in 1.0f64..2.9,
        step in 0.01f64..1.0,
    ) {
        // Amortisation only pays off when the base exceeds the increment.
        let scenario = scenario(increment + extra_base, increment);
        let high = low + step;
        let at_low = cost_per_student(low, &scenario, 4.0).unwrap();
        let at_high = cost_per_student(high, &scenario, 4.0).unwrap();
        prop_assert!(at_high < at_low, "{} !< {}", at_high, at_low);
        prop_assert!(at_high > increment * 4.0);
    }

    #[test]
    fn class_cost_is_linear_in_average(
        average in 1.0f64..3.0,
        base in 0.0f64..200.0,
        increment in 0.0f64..50.0,
    ) {
        let scenario = scenario(base, increment);
        let cost = monthly_cost_per_class(average, &scenario, 4.0).unwrap();
        let expected = (base + increment * (average - 1.0)) * 4.0;
        prop_assert!((cost - expected).abs() < 1e-9);
    }

    #[test]
    fn annual_savings_are_twelve_months(
        current in 1.0f64..3.0,
        target in 1.0f64..3.5,
        students in 0u32..5_000,
        price in 50.0f64..1_000.0,
        fixed in 0.0f64..50_000.0,
    ) {
        let result = simulate(&SimulationInputs {
            current_average: current,
            target_average: target,
            ticket_price: price,
            total_students: students,
            fixed_costs: fixed,
            scenario: ScenarioChoice::default(),
            weeks_per_month: 4.0,
        })
        .unwrap();
        prop_assert_eq!(result.annual_savings, result.monthly_savings * 12.0);
        prop_assert!(result.viability_score <= 100);
    }

    #[test]
    fn alerts_are_ordered_and_scored(
        current in 1.0f64..3.0,
        target in 1.0f64..4.0,
        price in 20.0f64..600.0,
    ) {
        let inputs = SimulationInputs {
            current_average: current,
            target_average: target,
            ticket_price: price,
            total_students: 100,
            fixed_costs: 0.0,
            scenario: ScenarioChoice::default(),
            weeks_per_month: 4.0,
        };
        let first = simulate(&inputs).unwrap();
        let second = simulate(&inputs).unwrap();
        prop_assert_eq!(&first, &second);

        let kinds: Vec<AlertKind> = first.alerts.iter().map(|a| a.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        prop_assert_eq!(&kinds, &sorted);

        let errors = kinds.iter().filter(|k| **k == AlertKind::Error).count() as i64;
        let warnings = kinds.iter().filter(|k| **k == AlertKind::Warning).count() as i64;
        let expected = (100 - 40 * errors - 15 * warnings).max(0);
        prop_assert_eq!(i64::from(first.viability_score), expected);

        let successes = kinds.iter().filter(|k| **k == AlertKind::Success).count();
        prop_assert_eq!(successes, usize::from(errors == 0 && warnings == 0));
        if target < current {
            prop_assert_eq!(kinds[0], AlertKind::Error);
        }
    }

    #[test]
    fn repasse_tracks_economy(
        current in 1.0f64..3.0,
        milestone in 1.0f64..3.0,
        share in 0.0f64..1.0,
        roster in 1u32..100,
    ) {
        let rows = generate_bonus_schedule(
            roster,
            current,
            &[milestone],
            &scenario(35.0, 10.0),
            share,
            4.0,
        )
        .unwrap();
        let row = &rows[0];
        if row.monthly_savings > 0.0 {
            prop_assert!((row.repasse_percent - row.suggested_bonus / row.monthly_savings * 100.0).abs() < 1e-9);
        } else {
            prop_assert_eq!(row.repasse_percent, 0.0);
        }
        prop_assert!((row.suggested_bonus + row.school_profit - row.monthly_savings).abs() < 1e-9);
    }
}
