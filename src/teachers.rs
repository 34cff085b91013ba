//! Per-teacher projection of the escalating pay scheme.
//!
//! Each teacher is projected from their own roster only; the unit-wide
//! average never leaks into an individual projection.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::cost;
use crate::error::{ensure_average, ensure_positive, EngineResult, SimulationError};
use crate::margin;
use crate::scenario::CompensationScenario;

/// One teacher as supplied by the roster source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub teacher_id: String,
    pub name: String,
    pub total_students: u32,
    pub total_classes: u32,
    /// Individually assigned target, when one has been set.
    pub target_override: Option<f64>,
}

impl RosterEntry {
    pub fn current_average(&self) -> EngineResult<f64> {
        if self.total_classes == 0 {
            return Err(SimulationError::invalid(
                format!("roster[{}].total_classes", self.teacher_id),
                "a teacher needs at least one class to be projected",
            ));
        }
        let average = f64::from(self.total_students) / f64::from(self.total_classes);
        ensure_average(&format!("roster[{}].current_average", self.teacher_id), average)
    }

    /// Returns a copy carrying `target` as the teacher's individual target.
    /// Persisting it is the caller's job.
    pub fn with_target(&self, target: f64) -> EngineResult<Self> {
        ensure_average(&format!("roster[{}].target_override", self.teacher_id), target)?;
        Ok(Self {
            target_override: Some(target),
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeacherStatus {
    Critical,
    Attention,
    Good,
    Excellent,
}

impl TeacherStatus {
    pub const ALL: [TeacherStatus; 4] = [
        Self::Critical,
        Self::Attention,
        Self::Good,
        Self::Excellent,
    ];

    pub fn classify(average: f64) -> Self {
        if average < 1.3 {
            Self::Critical
        } else if average < 1.7 {
            Self::Attention
        } else if average <= 2.0 {
            Self::Good
        } else {
            Self::Excellent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Attention => "attention",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherProjection {
    pub teacher_id: String,
    pub name: String,
    pub total_students: u32,
    pub total_classes: u32,
    pub current_average: f64,
    pub status: TeacherStatus,
    pub payroll_percent_current: f64,
    pub gross_margin_current: f64,
    /// Average the target-state figures are computed at: the override when
    /// set, the unit-wide target otherwise.
    pub projected_average: f64,
    pub payroll_percent_target: f64,
    pub gross_margin_target: f64,
    pub current_payroll: f64,
    pub target_payroll: f64,
    pub monthly_savings: f64,
    /// `override ?? min(global target, current + step)`.
    pub individual_target: f64,
    pub target_overridden: bool,
}

pub fn resolve_individual_target(
    target_override: Option<f64>,
    global_target: f64,
    current_average: f64,
    step: f64,
) -> f64 {
    target_override.unwrap_or_else(|| global_target.min(current_average + step))
}

/// Projects every teacher independently. Output order follows input order.
pub fn project_teachers(
    teachers: &[RosterEntry],
    target_average: f64,
    scenario: &CompensationScenario,
    ticket_price: f64,
    config: &EngineConfig,
) -> EngineResult<Vec<TeacherProjection>> {
    ensure_average("target_average", target_average)?;
    ensure_positive("ticket_price", ticket_price)?;
    scenario.validate()?;
    config.validate()?;

    let projections = teachers
        .par_iter()
        .map(|teacher| project_teacher(teacher, target_average, scenario, ticket_price, config))
        .collect::<EngineResult<Vec<_>>>()?;

    tracing::debug!(
        teachers = projections.len(),
        target_average,
        scenario = %scenario.id,
        "projected roster"
    );
    Ok(projections)
}

pub fn project_teacher(
    teacher: &RosterEntry,
    target_average: f64,
    scenario: &CompensationScenario,
    ticket_price: f64,
    config: &EngineConfig,
) -> EngineResult<TeacherProjection> {
    let current_average = teacher.current_average()?;
    if let Some(target) = teacher.target_override {
        ensure_average(&format!("roster[{}].target_override", teacher.teacher_id), target)?;
    }
    let projected_average = teacher.target_override.unwrap_or(target_average);
    let weeks = config.weeks_per_month;
    let students = f64::from(teacher.total_students);

    let cost_current = cost::cost_per_student(current_average, scenario, weeks)?;
    let cost_target = cost::cost_per_student(projected_average, scenario, weeks)?;
    let payroll_percent_current = margin::payroll_percent(cost_current, ticket_price);
    let payroll_percent_target = margin::payroll_percent(cost_target, ticket_price);
    let current_payroll = cost::payroll_for(students, current_average, scenario, weeks)?;
    let target_payroll = cost::payroll_for(students, projected_average, scenario, weeks)?;

    Ok(TeacherProjection {
        teacher_id: teacher.teacher_id.clone(),
        name: teacher.name.clone(),
        total_students: teacher.total_students,
        total_classes: teacher.total_classes,
        current_average,
        status: TeacherStatus::classify(current_average),
        payroll_percent_current,
        gross_margin_current: margin::gross_margin(payroll_percent_current),
        projected_average,
        payroll_percent_target,
        gross_margin_target: margin::gross_margin(payroll_percent_target),
        current_payroll,
        target_payroll,
        monthly_savings: current_payroll - target_payroll,
        individual_target: resolve_individual_target(
            teacher.target_override,
            target_average,
            current_average,
            config.individual_target_step,
        ),
        target_overridden: teacher.target_override.is_some(),
    })
}

/// Unit-wide average students per class across a whole roster.
pub fn roster_average(teachers: &[RosterEntry]) -> EngineResult<f64> {
    let students: u64 = teachers.iter().map(|t| u64::from(t.total_students)).sum();
    let classes: u64 = teachers.iter().map(|t| u64::from(t.total_classes)).sum();
    if classes == 0 {
        return Err(SimulationError::invalid(
            "roster",
            "no classes recorded for this roster",
        ));
    }
    ensure_average("roster.current_average", students as f64 / classes as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: TeacherStatus,
    pub teachers: usize,
}

/// Teacher counts per status, in severity order, including empty buckets.
pub fn summarize_statuses(projections: &[TeacherProjection]) -> Vec<StatusCount> {
    TeacherStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            teachers: projections.iter().filter(|p| p.status == status).count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioPreset;

    fn teacher(id: &str, students: u32, classes: u32) -> RosterEntry {
        RosterEntry {
            teacher_id: id.to_string(),
            name: format!("Teacher {id}"),
            total_students: students,
            total_classes: classes,
            target_override: None,
        }
    }

    fn project(roster: &[RosterEntry], target: f64) -> Vec<TeacherProjection> {
        project_teachers(
            roster,
            target,
            &ScenarioPreset::Current.scenario(),
            419.0,
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(TeacherStatus::classify(1.0), TeacherStatus::Critical);
        assert_eq!(TeacherStatus::classify(1.29), TeacherStatus::Critical);
        assert_eq!(TeacherStatus::classify(1.3), TeacherStatus::Attention);
        assert_eq!(TeacherStatus::classify(1.69), TeacherStatus::Attention);
        assert_eq!(TeacherStatus::classify(1.7), TeacherStatus::Good);
        assert_eq!(TeacherStatus::classify(2.0), TeacherStatus::Good);
        assert_eq!(TeacherStatus::classify(2.01), TeacherStatus::Excellent);
    }

    #[test]
    fn uses_the_teachers_own_average() {
        let projections = project(&[teacher("a", 20, 20), teacher("b", 40, 20)], 2.0);
        assert_eq!(projections[0].current_average, 1.0);
        assert_eq!(projections[0].status, TeacherStatus::Critical);
        assert_eq!(projections[1].current_average, 2.0);
        assert_eq!(projections[1].status, TeacherStatus::Good);
    }

    #[test]
    fn savings_compare_current_and_target_payroll() {
        let projections = project(&[teacher("a", 20, 20)], 2.0);
        let projection = &projections[0];
        // 20 classes of 140 vs 10 classes of 180
        assert!((projection.current_payroll - 2_800.0).abs() < 1e-9);
        assert!((projection.target_payroll - 1_800.0).abs() < 1e-9);
        assert!((projection.monthly_savings - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn default_individual_target_is_capped_step() {
        let projections = project(&[teacher("a", 20, 20), teacher("b", 36, 20)], 2.0);
        assert_eq!(projections[0].individual_target, 1.5);
        assert_eq!(projections[1].individual_target, 2.0);
        assert!(!projections[0].target_overridden);
        assert_eq!(projections[0].projected_average, 2.0);
    }

    #[test]
    fn override_drives_target_figures() {
        let entry = teacher("a", 20, 20).with_target(1.4).unwrap();
        let projections = project(&[entry], 2.0);
        assert_eq!(projections[0].individual_target, 1.4);
        assert_eq!(projections[0].projected_average, 1.4);
        assert!(projections[0].target_overridden);
    }

    #[test]
    fn teacher_without_classes_is_rejected() {
        let err = project_teachers(
            &[teacher("ghost", 0, 0)],
            2.0,
            &ScenarioPreset::Current.scenario(),
            419.0,
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.field(), "roster[ghost].total_classes");
    }

    #[test]
    fn override_below_one_is_rejected() {
        assert!(teacher("a", 20, 10).with_target(0.5).is_err());
    }

    #[test]
    fn output_preserves_roster_order() {
        let roster: Vec<RosterEntry> = (1..=50).map(|i| teacher(&i.to_string(), 30, 20)).collect();
        let projections = project(&roster, 2.0);
        let ids: Vec<&str> = projections.iter().map(|p| p.teacher_id.as_str()).collect();
        let expected: Vec<String> = (1..=50).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn roster_average_weights_by_classes() {
        let roster = [teacher("a", 20, 20), teacher("b", 40, 10)];
        assert_eq!(roster_average(&roster).unwrap(), 2.0);
        assert_eq!(roster_average(&[]).unwrap_err().field(), "roster");
    }

    #[test]
    fn status_summary_counts_every_bucket() {
        let projections = project(&[teacher("a", 20, 20), teacher("b", 21, 20), teacher("c", 50, 20)], 2.0);
        let summary = summarize_statuses(&projections);
        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].teachers, 2);
        assert_eq!(summary[1].teachers, 0);
        assert_eq!(summary[3].teachers, 1);
    }
}
