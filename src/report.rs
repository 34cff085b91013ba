use std::fmt::Write;

use classroom_profitability::guarantee::GuaranteeTransition;
use classroom_profitability::simulation::FullSimulation;
use classroom_profitability::teachers::{summarize_statuses, TeacherProjection, TeacherStatus};

pub fn build_report(unit: Option<&str>, simulation: &FullSimulation) -> String {
    let inputs = &simulation.inputs;
    let result = &simulation.result;
    let mut output = String::new();
    let unit_label = unit.unwrap_or("all units");

    let _ = writeln!(output, "# Classroom Profitability Report");
    let _ = writeln!(
        output,
        "Generated for {} under {} (base {:.2}, +{:.2} per extra student)",
        unit_label, result.scenario.name, result.scenario.base_pay, result.scenario.increment
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline");
    let _ = writeln!(
        output,
        "- Average students per class: {:.2} -> {:.2}",
        inputs.current_average, inputs.target_average
    );
    let _ = writeln!(
        output,
        "- Cost per student: {:.2} -> {:.2}",
        result.cost_per_student_current, result.cost_per_student_target
    );
    let _ = writeln!(
        output,
        "- Payroll share of revenue: {:.2}% -> {:.2}%",
        result.payroll_percent_current, result.payroll_percent_target
    );
    let _ = writeln!(
        output,
        "- Gross margin: {:.2}% -> {:.2}% ({:+.2} points)",
        result.gross_margin_current, result.gross_margin_target, result.margin_gain
    );
    let _ = writeln!(
        output,
        "- Monthly recurring revenue: {:.2} from {} students",
        result.monthly_recurring_revenue, inputs.total_students
    );
    let _ = writeln!(
        output,
        "- Savings: {:.2} per month, {:.2} per year",
        result.monthly_savings, result.annual_savings
    );
    let _ = writeln!(
        output,
        "- Net profit: {:.2} -> {:.2} (fixed costs {:.2})",
        result.net_profit_current, result.net_profit_target, inputs.fixed_costs
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Viability ({}/100)", result.viability_score);
    for alert in &result.alerts {
        let _ = writeln!(
            output,
            "- [{}] {}: {}",
            alert.kind.label(),
            alert.title,
            alert.message
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Teachers");
    if simulation.teachers.is_empty() {
        let _ = writeln!(output, "No teachers on the roster.");
    } else {
        for count in summarize_statuses(&simulation.teachers) {
            let _ = writeln!(output, "- {}: {}", count.status.label(), count.teachers);
        }
        let _ = writeln!(output);
        write_teachers_needing_attention(&mut output, &simulation.teachers);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Bonus Schedule");
    let _ = writeln!(
        output,
        "| Target | Savings | Bonus | School profit | Repasse |"
    );
    let _ = writeln!(output, "| --- | --- | --- | --- | --- |");
    for entry in &simulation.bonus_schedule {
        let _ = writeln!(
            output,
            "| {:.1} | {:.2} | {:.2} | {:.2} | {:.1}% |",
            entry.target_average,
            entry.monthly_savings,
            entry.suggested_bonus,
            entry.school_profit,
            entry.repasse_percent
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Income Guarantee Transition");
    match &simulation.guarantee {
        GuaranteeTransition::NotApplicable { reason } => {
            let _ = writeln!(output, "Not applicable: {reason}.");
        }
        GuaranteeTransition::Projected(projection) if !projection.guarantee_owed => {
            let _ = writeln!(
                output,
                "No guarantee owed: earnings at target ({:.2}) do not fall below current earnings ({:.2}).",
                projection.earnings_at_target, projection.earnings_at_current
            );
        }
        GuaranteeTransition::Projected(projection) => {
            let _ = writeln!(
                output,
                "- Teacher earnings: {:.2} -> {:.2} (gap {:.2} per month)",
                projection.earnings_at_current,
                projection.earnings_at_target,
                projection.guarantee_gap
            );
            let _ = writeln!(
                output,
                "- Pessimistic: {:.2} guaranteed over {} months ({})",
                projection.pessimistic_total_guarantee,
                projection.window.months,
                projection.pessimistic_outcome.label()
            );
            let _ = writeln!(
                output,
                "- Optimistic: {} seats filled, {:.2} new revenue, net {:.2} ({})",
                projection.new_students_filled,
                projection.optimistic_new_revenue,
                projection.optimistic_net_outcome,
                projection.optimistic_outcome.label()
            );
        }
    }

    output
}

fn write_teachers_needing_attention(output: &mut String, teachers: &[TeacherProjection]) {
    let mut flagged: Vec<&TeacherProjection> = teachers
        .iter()
        .filter(|t| matches!(t.status, TeacherStatus::Critical | TeacherStatus::Attention))
        .collect();
    flagged.sort_by(|a, b| {
        b.monthly_savings
            .partial_cmp(&a.monthly_savings)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let _ = writeln!(output, "### Largest opportunities");
    if flagged.is_empty() {
        let _ = writeln!(output, "Every teacher is at or above 1.7 students per class.");
        return;
    }
    for teacher in flagged.iter().take(10) {
        let _ = writeln!(
            output,
            "- {} ({}): {:.2} per class, target {:.2}, saves {:.2} per month",
            teacher.name,
            teacher.status.label(),
            teacher.current_average,
            teacher.individual_target,
            teacher.monthly_savings
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_profitability::config::EngineConfig;
    use classroom_profitability::scenario::ScenarioPreset;
    use classroom_profitability::simulation::{simulate_with_roster, SimulationInputs};
    use classroom_profitability::teachers::RosterEntry;

    fn simulation(roster: Vec<RosterEntry>) -> FullSimulation {
        let inputs = SimulationInputs {
            current_average: 1.3,
            target_average: 2.0,
            ticket_price: 419.0,
            total_students: 120,
            fixed_costs: 5_000.0,
            scenario: ScenarioPreset::Current.into(),
            weeks_per_month: 4.0,
        };
        simulate_with_roster(&inputs, &roster, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn report_lists_sections() {
        let roster = vec![RosterEntry {
            teacher_id: "t-001".to_string(),
            name: "Avery Lee".to_string(),
            total_students: 22,
            total_classes: 20,
            target_override: None,
        }];
        let report = build_report(Some("main"), &simulation(roster));
        assert!(report.contains("Generated for main"));
        assert!(report.contains("## Viability (100/100)"));
        assert!(report.contains("- critical: 1"));
        assert!(report.contains("Avery Lee (critical)"));
        assert!(report.contains("| 2.0 |"));
        assert!(report.contains("Pessimistic"));
    }

    #[test]
    fn empty_roster_is_reported() {
        let report = build_report(None, &simulation(Vec::new()));
        assert!(report.contains("all units"));
        assert!(report.contains("No teachers on the roster."));
    }
}
