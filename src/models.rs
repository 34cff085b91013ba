use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use classroom_profitability::simulation::{SimulationInputs, SimulationResult};

/// One line of a roster CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterRow {
    pub teacher_id: String,
    pub full_name: String,
    pub total_students: u32,
    pub total_classes: u32,
}

#[derive(Debug, Clone)]
pub struct UnitPricing {
    pub unit: String,
    pub ticket_price: f64,
    pub fixed_costs: f64,
}

/// A simulation snapshot kept under a name for later comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedScenario {
    pub id: Uuid,
    pub unit: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub inputs: SimulationInputs,
    pub result: SimulationResult,
}

#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub viability_score: u8,
    pub monthly_savings: f64,
    pub target_average: f64,
}
