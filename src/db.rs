use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use classroom_profitability::simulation::{SimulationInputs, SimulationResult};
use classroom_profitability::teachers::RosterEntry;

use crate::models::{RosterRow, SavedScenario, ScenarioSummary, UnitPricing};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    upsert_unit(pool, "main", 419.0, 5_000.0).await?;

    let teachers = vec![
        ("t-001", "Avery Lee", 26, 22),
        ("t-002", "Jules Moreno", 31, 20),
        ("t-003", "Kiara Patel", 38, 21),
        ("t-004", "Noah Fischer", 18, 16),
        ("t-005", "Lucia Ferreira", 45, 19),
    ];

    for (teacher_id, name, students, classes) in teachers {
        upsert_teacher(pool, "main", teacher_id, name, students, classes).await?;
    }

    Ok(())
}

pub async fn upsert_unit(
    pool: &PgPool,
    unit: &str,
    ticket_price: f64,
    fixed_costs: f64,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO classroom_sim.units (id, ticket_price, fixed_costs)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
        SET ticket_price = EXCLUDED.ticket_price, fixed_costs = EXCLUDED.fixed_costs
        "#,
    )
    .bind(unit)
    .bind(ticket_price)
    .bind(fixed_costs)
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_teacher(
    pool: &PgPool,
    unit: &str,
    teacher_id: &str,
    name: &str,
    total_students: i32,
    total_classes: i32,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO classroom_sim.teachers
        (teacher_id, unit, full_name, total_students, total_classes, updated_at)
        VALUES ($1, $2, $3, $4, $5, now())
        ON CONFLICT (teacher_id) DO UPDATE
        SET unit = EXCLUDED.unit,
            full_name = EXCLUDED.full_name,
            total_students = EXCLUDED.total_students,
            total_classes = EXCLUDED.total_classes,
            updated_at = now()
        WHERE (classroom_sim.teachers.unit, classroom_sim.teachers.full_name,
               classroom_sim.teachers.total_students, classroom_sim.teachers.total_classes)
              IS DISTINCT FROM
              (EXCLUDED.unit, EXCLUDED.full_name, EXCLUDED.total_students, EXCLUDED.total_classes)
        "#,
    )
    .bind(teacher_id)
    .bind(unit)
    .bind(name)
    .bind(total_students)
    .bind(total_classes)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn import_roster_csv(
    pool: &PgPool,
    unit: &str,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut changed = 0usize;

    for (line, result) in reader.deserialize::<RosterRow>().enumerate() {
        let row = result.with_context(|| format!("invalid roster row {}", line + 1))?;
        let students = i32::try_from(row.total_students).context("total_students too large")?;
        let classes = i32::try_from(row.total_classes).context("total_classes too large")?;
        if upsert_teacher(pool, unit, &row.teacher_id, &row.full_name, students, classes).await? > 0
        {
            changed += 1;
        }
    }

    tracing::info!(unit, changed, "roster import finished");
    Ok(changed)
}

pub async fn fetch_roster(pool: &PgPool, unit: &str) -> anyhow::Result<Vec<RosterEntry>> {
    let records = sqlx::query(
        "SELECT teacher_id, full_name, total_students, total_classes, target_override \
         FROM classroom_sim.teachers \
         WHERE unit = $1 \
         ORDER BY full_name",
    )
    .bind(unit)
    .fetch_all(pool)
    .await?;

    let mut roster = Vec::with_capacity(records.len());
    for row in records {
        let teacher_id: String = row.get("teacher_id");
        let students: i32 = row.get("total_students");
        let classes: i32 = row.get("total_classes");
        roster.push(RosterEntry {
            total_students: u32::try_from(students)
                .with_context(|| format!("negative student count for {teacher_id}"))?,
            total_classes: u32::try_from(classes)
                .with_context(|| format!("negative class count for {teacher_id}"))?,
            name: row.get("full_name"),
            target_override: row.get("target_override"),
            teacher_id,
        });
    }

    Ok(roster)
}

pub async fn fetch_unit_pricing(pool: &PgPool, unit: &str) -> anyhow::Result<UnitPricing> {
    let row = sqlx::query(
        "SELECT id, ticket_price, fixed_costs FROM classroom_sim.units WHERE id = $1",
    )
    .bind(unit)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("unit `{unit}` has no pricing on record"))?;

    Ok(UnitPricing {
        unit: row.get("id"),
        ticket_price: row.get("ticket_price"),
        fixed_costs: row.get("fixed_costs"),
    })
}

pub async fn set_individual_target(
    pool: &PgPool,
    teacher_id: &str,
    target: Option<f64>,
) -> anyhow::Result<()> {
    let result = sqlx::query(
        "UPDATE classroom_sim.teachers SET target_override = $2, updated_at = now() \
         WHERE teacher_id = $1",
    )
    .bind(teacher_id)
    .bind(target)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        anyhow::bail!("no teacher with id `{teacher_id}`");
    }
    Ok(())
}

pub async fn save_scenario(
    pool: &PgPool,
    unit: &str,
    name: &str,
    inputs: &SimulationInputs,
    result: &SimulationResult,
) -> anyhow::Result<SavedScenario> {
    let row = sqlx::query(
        r#"
        INSERT INTO classroom_sim.saved_scenarios (id, unit, name, inputs, result)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (unit, name) DO UPDATE
        SET inputs = EXCLUDED.inputs, result = EXCLUDED.result, created_at = now()
        RETURNING id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(unit)
    .bind(name)
    .bind(Json(inputs))
    .bind(Json(result))
    .fetch_one(pool)
    .await?;

    Ok(SavedScenario {
        id: row.get("id"),
        unit: unit.to_string(),
        name: name.to_string(),
        created_at: row.get("created_at"),
        inputs: inputs.clone(),
        result: result.clone(),
    })
}

pub async fn list_scenarios(pool: &PgPool, unit: &str) -> anyhow::Result<Vec<ScenarioSummary>> {
    let records = sqlx::query(
        "SELECT name, created_at, inputs, result FROM classroom_sim.saved_scenarios \
         WHERE unit = $1 ORDER BY created_at DESC",
    )
    .bind(unit)
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(records.len());
    for row in records {
        let created_at: DateTime<Utc> = row.get("created_at");
        let Json(inputs): Json<SimulationInputs> = row.try_get("inputs")?;
        let Json(result): Json<SimulationResult> = row.try_get("result")?;
        summaries.push(ScenarioSummary {
            name: row.get("name"),
            created_at,
            viability_score: result.viability_score,
            monthly_savings: result.monthly_savings,
            target_average: inputs.target_average,
        });
    }

    Ok(summaries)
}

pub async fn fetch_scenario(
    pool: &PgPool,
    unit: &str,
    name: &str,
) -> anyhow::Result<SavedScenario> {
    let row = sqlx::query(
        "SELECT id, created_at, inputs, result FROM classroom_sim.saved_scenarios \
         WHERE unit = $1 AND name = $2",
    )
    .bind(unit)
    .bind(name)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no saved scenario named `{name}` for unit `{unit}`"))?;

    let Json(inputs): Json<SimulationInputs> = row.try_get("inputs")?;
    let Json(result): Json<SimulationResult> = row.try_get("result")?;
    Ok(SavedScenario {
        id: row.get("id"),
        unit: unit.to_string(),
        name: name.to_string(),
        created_at: row.get("created_at"),
        inputs,
        result,
    })
}
