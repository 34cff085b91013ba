use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use classroom_profitability::bonus::generate_bonus_schedule;
use classroom_profitability::config::{
    EngineConfig, DEFAULT_FILLED_REVENUE_MONTHS, DEFAULT_GUARANTEE_MONTHS,
    DEFAULT_INDIVIDUAL_TARGET_STEP, DEFAULT_MILESTONES, DEFAULT_REPASSE_SHARE,
    DEFAULT_REPRESENTATIVE_ROSTER, DEFAULT_WEEKS_PER_MONTH,
};
use classroom_profitability::guarantee::{project_guarantee_transition, GuaranteeTransition};
use classroom_profitability::scenario::{ScenarioChoice, ScenarioPreset};
use classroom_profitability::simulation::{simulate, simulate_with_roster, SimulationInputs};
use classroom_profitability::teachers::{self, project_teachers};

mod db;
mod models;
mod report;

#[derive(Parser)]
#[command(name = "classroom-sim")]
#[command(about = "Classroom profitability and teacher compensation simulator", long_about = None)]
struct Cli {
    /// Emit diagnostics as JSON lines
    #[arg(long, global = true, env = "CLASSROOM_SIM_JSON_LOGS")]
    json_logs: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a realistic demo unit and roster
    Seed,
    /// Record ticket price and fixed costs for a unit
    Unit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        ticket_price: f64,
        #[arg(long, default_value_t = 0.0)]
        fixed_costs: f64,
    },
    /// Import a teacher roster from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "main", env = "CLASSROOM_SIM_UNIT")]
        unit: String,
    },
    /// List the built-in compensation scenarios
    Catalog,
    /// Simulate a unit moving to a target average
    Simulate {
        #[command(flatten)]
        unit: UnitArgs,
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Save the result under this name
        #[arg(long)]
        save: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Project every teacher on a unit's roster
    Teachers {
        #[arg(long, default_value = "main", env = "CLASSROOM_SIM_UNIT")]
        unit: String,
        #[arg(long)]
        target_average: f64,
        #[arg(long)]
        ticket_price: Option<f64>,
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Assign (or clear, when no target is given) a teacher's individual target
    SetTarget {
        #[arg(long, default_value = "main", env = "CLASSROOM_SIM_UNIT")]
        unit: String,
        #[arg(long)]
        teacher: String,
        #[arg(long)]
        target: Option<f64>,
    },
    /// Bonus schedule for a representative teacher
    Bonus {
        #[arg(long)]
        current_average: f64,
        /// Students of the representative teacher
        #[arg(long)]
        roster_size: Option<u32>,
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Cost of guaranteeing a teacher's income during a transition
    Guarantee {
        #[arg(long)]
        students_per_teacher: Option<u32>,
        #[arg(long)]
        current_average: f64,
        #[arg(long)]
        target_average: f64,
        #[arg(long)]
        ticket_price: f64,
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Generate a markdown report for a unit
    Report {
        #[command(flatten)]
        unit: UnitArgs,
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List saved scenarios, or show one by name
    Scenarios {
        #[arg(long, default_value = "main", env = "CLASSROOM_SIM_UNIT")]
        unit: String,
        #[arg(long)]
        name: Option<String>,
    },
}

/// Unit-level inputs. Anything omitted is read from the store.
#[derive(Args)]
struct UnitArgs {
    #[arg(long, default_value = "main", env = "CLASSROOM_SIM_UNIT")]
    unit: String,
    #[arg(long)]
    current_average: Option<f64>,
    #[arg(long)]
    target_average: f64,
    #[arg(long)]
    ticket_price: Option<f64>,
    #[arg(long)]
    total_students: Option<u32>,
    #[arg(long)]
    fixed_costs: Option<f64>,
}

impl UnitArgs {
    fn needs_store(&self) -> bool {
        self.current_average.is_none()
            || self.ticket_price.is_none()
            || self.total_students.is_none()
            || self.fixed_costs.is_none()
    }
}

#[derive(Args)]
struct ScenarioArgs {
    /// Preset id from `catalog`
    #[arg(long, default_value = "current")]
    scenario: String,
    /// Custom base pay per class-week; overrides --scenario
    #[arg(long, requires = "increment")]
    base_pay: Option<f64>,
    /// Custom increment per additional student
    #[arg(long, requires = "base_pay")]
    increment: Option<f64>,
}

impl ScenarioArgs {
    fn choice(&self) -> anyhow::Result<ScenarioChoice> {
        if let (Some(base_pay), Some(increment)) = (self.base_pay, self.increment) {
            return Ok(ScenarioChoice::Custom {
                base_pay,
                increment,
            });
        }
        let preset = ScenarioPreset::from_id(&self.scenario)
            .with_context(|| format!("unknown scenario `{}`", self.scenario))?;
        Ok(preset.into())
    }
}

#[derive(Args)]
struct PolicyArgs {
    #[arg(long, env = "CLASSROOM_SIM_WEEKS_PER_MONTH", default_value_t = DEFAULT_WEEKS_PER_MONTH)]
    weeks_per_month: f64,
    #[arg(long, env = "CLASSROOM_SIM_REPASSE_SHARE", default_value_t = DEFAULT_REPASSE_SHARE)]
    repasse_share: f64,
    #[arg(
        long,
        env = "CLASSROOM_SIM_MILESTONES",
        value_delimiter = ',',
        default_values_t = DEFAULT_MILESTONES.to_vec()
    )]
    milestones: Vec<f64>,
    #[arg(long, env = "CLASSROOM_SIM_REPRESENTATIVE_ROSTER", default_value_t = DEFAULT_REPRESENTATIVE_ROSTER)]
    representative_roster_size: u32,
    #[arg(long, env = "CLASSROOM_SIM_GUARANTEE_MONTHS", default_value_t = DEFAULT_GUARANTEE_MONTHS)]
    guarantee_months: u32,
    #[arg(long, env = "CLASSROOM_SIM_FILLED_REVENUE_MONTHS", default_value_t = DEFAULT_FILLED_REVENUE_MONTHS)]
    filled_revenue_months: u32,
    #[arg(long, env = "CLASSROOM_SIM_TARGET_STEP", default_value_t = DEFAULT_INDIVIDUAL_TARGET_STEP)]
    individual_target_step: f64,
}

impl PolicyArgs {
    fn config(&self) -> anyhow::Result<EngineConfig> {
        let config = EngineConfig {
            weeks_per_month: self.weeks_per_month,
            repasse_share: self.repasse_share,
            bonus_milestones: self.milestones.clone(),
            representative_roster_size: self.representative_roster_size,
            guarantee_months: self.guarantee_months,
            filled_revenue_months: self.filled_revenue_months,
            individual_target_step: self.individual_target_step,
        };
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_env("CLASSROOM_SIM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn unit_inputs(
    args: &UnitArgs,
    scenario: ScenarioChoice,
    weeks_per_month: f64,
    pool: Option<&PgPool>,
) -> anyhow::Result<SimulationInputs> {
    let (ticket_price, fixed_costs) = match (args.ticket_price, args.fixed_costs) {
        (Some(price), Some(fixed)) => (price, fixed),
        (price, fixed) => {
            let pool = pool.context("pass --ticket-price and --fixed-costs or configure a store")?;
            let pricing = db::fetch_unit_pricing(pool, &args.unit).await?;
            tracing::debug!(unit = %pricing.unit, "loaded unit pricing");
            (
                price.unwrap_or(pricing.ticket_price),
                fixed.unwrap_or(pricing.fixed_costs),
            )
        }
    };

    let (current_average, total_students) = match (args.current_average, args.total_students) {
        (Some(average), Some(students)) => (average, students),
        (average, students) => {
            let pool =
                pool.context("pass --current-average and --total-students or configure a store")?;
            let roster = db::fetch_roster(pool, &args.unit).await?;
            let average = match average {
                Some(average) => average,
                None => teachers::roster_average(&roster)?,
            };
            let students =
                students.unwrap_or_else(|| roster.iter().map(|t| t.total_students).sum());
            (average, students)
        }
    };

    Ok(SimulationInputs {
        current_average,
        target_average: args.target_average,
        ticket_price,
        total_students,
        fixed_costs,
        scenario,
        weeks_per_month,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Unit {
            id,
            ticket_price,
            fixed_costs,
        } => {
            let pool = connect().await?;
            db::upsert_unit(&pool, &id, ticket_price, fixed_costs).await?;
            println!("Unit {id} priced at {ticket_price:.2} with {fixed_costs:.2} fixed costs.");
        }
        Commands::Import { csv, unit } => {
            let pool = connect().await?;
            let changed = db::import_roster_csv(&pool, &unit, &csv).await?;
            println!("Updated {changed} teachers from {}.", csv.display());
        }
        Commands::Catalog => {
            for preset in ScenarioPreset::ALL {
                let scenario = preset.scenario();
                println!(
                    "- {} ({}): base {:.2}, +{:.2} per extra student",
                    scenario.id, scenario.name, scenario.base_pay, scenario.increment
                );
            }
        }
        Commands::Simulate {
            unit,
            scenario,
            policy,
            save,
            json,
        } => {
            let config = policy.config()?;
            let pool = if unit.needs_store() || save.is_some() {
                Some(connect().await?)
            } else {
                None
            };
            let inputs =
                unit_inputs(&unit, scenario.choice()?, config.weeks_per_month, pool.as_ref())
                    .await?;
            let result = simulate(&inputs)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{} students at {:.2} -> {:.2} per class under {}",
                    inputs.total_students,
                    inputs.current_average,
                    inputs.target_average,
                    result.scenario.name
                );
                println!(
                    "- cost per student {:.2} -> {:.2}",
                    result.cost_per_student_current, result.cost_per_student_target
                );
                println!(
                    "- gross margin {:.2}% -> {:.2}%",
                    result.gross_margin_current, result.gross_margin_target
                );
                println!(
                    "- savings {:.2}/month, {:.2}/year",
                    result.monthly_savings, result.annual_savings
                );
                println!(
                    "- net profit {:.2} -> {:.2}",
                    result.net_profit_current, result.net_profit_target
                );
                println!("Viability score {}/100", result.viability_score);
                for alert in &result.alerts {
                    println!("- [{}] {}: {}", alert.kind.label(), alert.title, alert.message);
                }
            }

            if let (Some(name), Some(pool)) = (save, pool.as_ref()) {
                match db::save_scenario(pool, &unit.unit, &name, &inputs, &result).await {
                    Ok(saved) => println!("Saved scenario {} ({}).", saved.name, saved.id),
                    Err(err) => {
                        tracing::error!(error = %err, scenario = %name, "failed to save scenario");
                        return Err(err);
                    }
                }
            }
        }
        Commands::Teachers {
            unit,
            target_average,
            ticket_price,
            scenario,
            policy,
            limit,
        } => {
            let config = policy.config()?;
            let pool = connect().await?;
            let roster = db::fetch_roster(&pool, &unit).await?;
            let ticket_price = match ticket_price {
                Some(price) => price,
                None => db::fetch_unit_pricing(&pool, &unit).await?.ticket_price,
            };
            let scenario = scenario.choice()?.resolve()?;
            let mut projections =
                project_teachers(&roster, target_average, &scenario, ticket_price, &config)?;

            if projections.is_empty() {
                println!("No teachers on the roster for {unit}.");
                return Ok(());
            }

            for count in teachers::summarize_statuses(&projections) {
                println!("{}: {}", count.status.label(), count.teachers);
            }
            projections.sort_by(|a, b| {
                b.monthly_savings
                    .partial_cmp(&a.monthly_savings)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            println!("Teachers by monthly savings at target:");
            for projection in projections.iter().take(limit) {
                println!(
                    "- {} ({}) {:.2} per class [{}], margin {:.2}% -> {:.2}%, saves {:.2}, target {:.2}{}",
                    projection.name,
                    projection.teacher_id,
                    projection.current_average,
                    projection.status.label(),
                    projection.gross_margin_current,
                    projection.gross_margin_target,
                    projection.monthly_savings,
                    projection.individual_target,
                    if projection.target_overridden { " (assigned)" } else { "" }
                );
            }
        }
        Commands::SetTarget {
            unit,
            teacher,
            target,
        } => {
            let pool = connect().await?;
            let roster = db::fetch_roster(&pool, &unit).await?;
            let entry = roster
                .iter()
                .find(|entry| entry.teacher_id == teacher)
                .with_context(|| format!("no teacher `{teacher}` in unit `{unit}`"))?;
            let target = match target {
                Some(target) => entry.with_target(target)?.target_override,
                None => None,
            };
            db::set_individual_target(&pool, &teacher, target).await?;
            match target {
                Some(target) => println!("Target for {} set to {target:.2}.", entry.name),
                None => println!("Target for {} cleared.", entry.name),
            }
        }
        Commands::Bonus {
            current_average,
            roster_size,
            scenario,
            policy,
        } => {
            let config = policy.config()?;
            let scenario = scenario.choice()?.resolve()?;
            let roster_size = roster_size.unwrap_or(config.representative_roster_size);
            let schedule = generate_bonus_schedule(
                roster_size,
                current_average,
                &config.bonus_milestones,
                &scenario,
                config.repasse_share,
                config.weeks_per_month,
            )?;

            println!(
                "Bonus schedule for a {roster_size}-student teacher at {current_average:.2} per class:"
            );
            for entry in &schedule {
                println!(
                    "- target {:.1}: saves {:.2}, bonus {:.2}, school keeps {:.2} ({:.1}% repasse)",
                    entry.target_average,
                    entry.monthly_savings,
                    entry.suggested_bonus,
                    entry.school_profit,
                    entry.repasse_percent
                );
            }
        }
        Commands::Guarantee {
            students_per_teacher,
            current_average,
            target_average,
            ticket_price,
            scenario,
            policy,
        } => {
            let config = policy.config()?;
            let scenario = scenario.choice()?.resolve()?;
            let transition = project_guarantee_transition(
                students_per_teacher.unwrap_or(config.representative_roster_size),
                current_average,
                target_average,
                &scenario,
                ticket_price,
                config.weeks_per_month,
                config.guarantee_window()?,
            )?;

            match transition {
                GuaranteeTransition::NotApplicable { reason } => {
                    println!("Guarantee not applicable: {reason}.");
                }
                GuaranteeTransition::Projected(projection) => {
                    println!(
                        "Earnings {:.2} -> {:.2}, gap {:.2}/month{}",
                        projection.earnings_at_current,
                        projection.earnings_at_target,
                        projection.guarantee_gap,
                        if projection.guarantee_owed { "" } else { " (no guarantee owed)" }
                    );
                    println!(
                        "- pessimistic: {:.2} over {} months ({})",
                        projection.pessimistic_total_guarantee,
                        projection.window.months,
                        projection.pessimistic_outcome.label()
                    );
                    println!(
                        "- optimistic: {} seats filled, {:.2} new revenue, net {:.2} ({})",
                        projection.new_students_filled,
                        projection.optimistic_new_revenue,
                        projection.optimistic_net_outcome,
                        projection.optimistic_outcome.label()
                    );
                }
            }
        }
        Commands::Report {
            unit,
            scenario,
            policy,
            out,
        } => {
            let config = policy.config()?;
            let pool = connect().await?;
            let inputs = unit_inputs(&unit, scenario.choice()?, config.weeks_per_month, Some(&pool))
                .await?;
            let roster = db::fetch_roster(&pool, &unit.unit).await?;
            let simulation = simulate_with_roster(&inputs, &roster, &config)?;
            let report = report::build_report(Some(&unit.unit), &simulation);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Scenarios { unit, name } => {
            let pool = connect().await?;
            match name {
                Some(name) => {
                    let saved = db::fetch_scenario(&pool, &unit, &name).await?;
                    println!("{}", serde_json::to_string_pretty(&saved)?);
                }
                None => {
                    let scenarios = db::list_scenarios(&pool, &unit).await?;
                    if scenarios.is_empty() {
                        println!("No saved scenarios for {unit}.");
                        return Ok(());
                    }
                    for scenario in scenarios {
                        println!(
                            "- {} ({}) target {:.2}, score {}, saves {:.2}/month",
                            scenario.name,
                            scenario.created_at.format("%Y-%m-%d %H:%M"),
                            scenario.target_average,
                            scenario.viability_score,
                            scenario.monthly_savings
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
