//! Unit-level simulation: one immutable input set in, one immutable result out.
//!
//! Results are a pure function of the inputs. Callers re-run on every change
//! and discard stale results; nothing is remembered between calls.

use serde::{Deserialize, Serialize};

use crate::bonus::{self, BonusScheduleEntry};
use crate::config::{EngineConfig, DEFAULT_WEEKS_PER_MONTH};
use crate::cost;
use crate::error::{ensure_average, ensure_non_negative, ensure_positive, EngineResult};
use crate::guarantee::{self, GuaranteeTransition};
use crate::margin;
use crate::scenario::{CompensationScenario, ScenarioChoice};
use crate::teachers::{self, RosterEntry, TeacherProjection};
use crate::viability::{self, ViabilityAlert, ViabilityInput};

fn default_weeks_per_month() -> f64 {
    DEFAULT_WEEKS_PER_MONTH
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInputs {
    pub current_average: f64,
    pub target_average: f64,
    pub ticket_price: f64,
    pub total_students: u32,
    pub fixed_costs: f64,
    pub scenario: ScenarioChoice,
    #[serde(default = "default_weeks_per_month")]
    pub weeks_per_month: f64,
}

impl SimulationInputs {
    pub fn validate(&self) -> EngineResult<CompensationScenario> {
        ensure_average("current_average", self.current_average)?;
        ensure_average("target_average", self.target_average)?;
        ensure_positive("ticket_price", self.ticket_price)?;
        ensure_non_negative("fixed_costs", self.fixed_costs)?;
        ensure_positive("weeks_per_month", self.weeks_per_month)?;
        self.scenario.resolve()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenario: CompensationScenario,
    pub cost_per_student_current: f64,
    pub cost_per_student_target: f64,
    pub payroll_percent_current: f64,
    pub payroll_percent_target: f64,
    pub gross_margin_current: f64,
    pub gross_margin_target: f64,
    pub margin_gain: f64,
    pub payroll_current: f64,
    pub payroll_target: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub monthly_recurring_revenue: f64,
    pub gross_profit_current: f64,
    pub gross_profit_target: f64,
    pub net_profit_current: f64,
    pub net_profit_target: f64,
    pub viability_score: u8,
    pub alerts: Vec<ViabilityAlert>,
}

pub fn simulate(inputs: &SimulationInputs) -> EngineResult<SimulationResult> {
    let scenario = inputs.validate()?;
    let weeks = inputs.weeks_per_month;
    let students = f64::from(inputs.total_students);

    let cost_per_student_current = cost::cost_per_student(inputs.current_average, &scenario, weeks)?;
    let cost_per_student_target = cost::cost_per_student(inputs.target_average, &scenario, weeks)?;

    let payroll_percent_current = margin::payroll_percent(cost_per_student_current, inputs.ticket_price);
    let payroll_percent_target = margin::payroll_percent(cost_per_student_target, inputs.ticket_price);
    let gross_margin_current = margin::gross_margin(payroll_percent_current);
    let gross_margin_target = margin::gross_margin(payroll_percent_target);

    let payroll_current = cost_per_student_current * students;
    let payroll_target = cost_per_student_target * students;
    let monthly_savings = payroll_current - payroll_target;

    let revenue = margin::monthly_recurring_revenue(inputs.total_students, inputs.ticket_price);
    let gross_profit_current = margin::gross_profit(revenue, payroll_current);
    let gross_profit_target = margin::gross_profit(revenue, payroll_target);

    let assessment = viability::assess(&ViabilityInput {
        current_average: inputs.current_average,
        target_average: inputs.target_average,
        margin_at_current: gross_margin_current,
        margin_at_target: gross_margin_target,
        monthly_savings,
    });

    if gross_margin_target < 0.0 {
        tracing::warn!(
            gross_margin_target,
            target_average = inputs.target_average,
            scenario = %scenario.id,
            "payroll exceeds revenue at target average"
        );
    }
    tracing::debug!(
        current_average = inputs.current_average,
        target_average = inputs.target_average,
        monthly_savings,
        score = assessment.score,
        "simulated unit"
    );

    Ok(SimulationResult {
        scenario,
        cost_per_student_current,
        cost_per_student_target,
        payroll_percent_current,
        payroll_percent_target,
        gross_margin_current,
        gross_margin_target,
        margin_gain: gross_margin_target - gross_margin_current,
        payroll_current,
        payroll_target,
        monthly_savings,
        annual_savings: monthly_savings * 12.0,
        monthly_recurring_revenue: revenue,
        gross_profit_current,
        gross_profit_target,
        net_profit_current: margin::net_profit(gross_profit_current, inputs.fixed_costs),
        net_profit_target: margin::net_profit(gross_profit_target, inputs.fixed_costs),
        viability_score: assessment.score,
        alerts: assessment.alerts,
    })
}

/// Unit simulation plus every per-teacher and on-demand projection that hangs
/// off the same inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullSimulation {
    pub inputs: SimulationInputs,
    pub result: SimulationResult,
    pub teachers: Vec<TeacherProjection>,
    pub bonus_schedule: Vec<BonusScheduleEntry>,
    pub guarantee: GuaranteeTransition,
}

pub fn simulate_with_roster(
    inputs: &SimulationInputs,
    roster: &[RosterEntry],
    config: &EngineConfig,
) -> EngineResult<FullSimulation> {
    config.validate()?;
    let result = simulate(inputs)?;
    let scenario = &result.scenario;
    // The unit's own week count wins over the configured default.
    let config = EngineConfig {
        weeks_per_month: inputs.weeks_per_month,
        ..config.clone()
    };

    let teachers = teachers::project_teachers(
        roster,
        inputs.target_average,
        scenario,
        inputs.ticket_price,
        &config,
    )?;
    let bonus_schedule = bonus::default_bonus_schedule(inputs.current_average, scenario, &config)?;
    let guarantee = guarantee::project_guarantee_transition(
        config.representative_roster_size,
        inputs.current_average,
        inputs.target_average,
        scenario,
        inputs.ticket_price,
        config.weeks_per_month,
        config.guarantee_window()?,
    )?;

    Ok(FullSimulation {
        inputs: inputs.clone(),
        result,
        teachers,
        bonus_schedule,
        guarantee,
    })
}
