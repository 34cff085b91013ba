//! Classroom profitability and compensation simulation engine.
//!
//! Models how an escalating per-student pay scheme moves payroll, margin and
//! profit as the average number of students per class changes. Every function
//! here is pure and synchronous; persistence and presentation live outside.

pub mod bonus;
pub mod config;
pub mod cost;
pub mod error;
pub mod guarantee;
pub mod margin;
pub mod scenario;
pub mod simulation;
pub mod teachers;
pub mod viability;

pub use bonus::{generate_bonus_schedule, BonusScheduleEntry};
pub use config::EngineConfig;
pub use error::{EngineResult, SimulationError};
pub use guarantee::{project_guarantee_transition, GuaranteeProjection, GuaranteeTransition};
pub use scenario::{CompensationScenario, ScenarioChoice, ScenarioPreset};
pub use simulation::{simulate, simulate_with_roster, SimulationInputs, SimulationResult};
pub use teachers::{project_teachers, RosterEntry, TeacherProjection, TeacherStatus};
pub use viability::{AlertKind, ViabilityAlert};
