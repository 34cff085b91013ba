//! Compensation scenarios: a closed catalog of presets plus caller-defined custom pay.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, EngineResult};

/// Escalating pay for one class: `base_pay` with a single student, plus
/// `increment` for every additional student in the same class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationScenario {
    pub id: String,
    pub name: String,
    pub base_pay: f64,
    pub increment: f64,
}

impl CompensationScenario {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_pay: f64,
        increment: f64,
    ) -> EngineResult<Self> {
        let scenario = Self {
            id: id.into(),
            name: name.into(),
            base_pay,
            increment,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> EngineResult<()> {
        ensure_non_negative("scenario.base_pay", self.base_pay)?;
        ensure_non_negative("scenario.increment", self.increment)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPreset {
    Current,
    Moderate,
    Aggressive,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 3] = [Self::Current, Self::Moderate, Self::Aggressive];

    pub fn id(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Current => "Current pay table",
            Self::Moderate => "Moderate escalation",
            Self::Aggressive => "Aggressive escalation",
        }
    }

    /// (base pay, increment) per class-week.
    fn rates(self) -> (f64, f64) {
        match self {
            Self::Current => (35.0, 10.0),
            Self::Moderate => (30.0, 12.5),
            Self::Aggressive => (25.0, 15.0),
        }
    }

    pub fn scenario(self) -> CompensationScenario {
        let (base_pay, increment) = self.rates();
        CompensationScenario {
            id: self.id().to_string(),
            name: self.display_name().to_string(),
            base_pay,
            increment,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.id() == id)
    }
}

/// The scenario a simulation runs against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioChoice {
    Preset { preset: ScenarioPreset },
    Custom { base_pay: f64, increment: f64 },
}

impl ScenarioChoice {
    pub fn resolve(&self) -> EngineResult<CompensationScenario> {
        match self {
            Self::Preset { preset } => Ok(preset.scenario()),
            Self::Custom {
                base_pay,
                increment,
            } => CompensationScenario::new("custom", "Custom scenario", *base_pay, *increment),
        }
    }
}

impl From<ScenarioPreset> for ScenarioChoice {
    fn from(preset: ScenarioPreset) -> Self {
        Self::Preset { preset }
    }
}

impl Default for ScenarioChoice {
    fn default() -> Self {
        ScenarioPreset::Current.into()
    }
}
