//! Headless driver for the viewport engine.
//!
//! Runs [`EngineCore`] without a browser: advance the clock, replay drags,
//! probe hit-tests and fire the control-panel scenarios, printing the result
//! as text or JSON.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use viewport::config::{ConfigError, EngineConfig};
use viewport::engine::EngineCore;
use viewport::flow::FlowKind;
use viewport::hit;
use viewport::input::PointerEvent;
use viewport::pointer::Point;
use viewport::scene::Scene;


#[derive(Debug, thiserror::Error)]
enum SimError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),
    #[error("entity `{id}` is covered at its center by `{by}`")]
    Occluded { id: String, by: String },
}

#[derive(Parser, Debug)]
#[command(name = "viewport-sim", about = "Headless driver for the architecture viewport engine")]
struct Cli {
    /// Viewport width in CSS pixels.
    #[arg(long, env = "VIEWPORT_WIDTH", default_value_t = 1200.0)]
    width: f64,

    /// Viewport height in CSS pixels.
    #[arg(long, env = "VIEWPORT_HEIGHT", default_value_t = 900.0)]
    height: f64,

    /// JSON config file. Without it, `VIEWPORT_*` variables are used.
    #[arg(long, env = "VIEWPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Advance the clock and report the resulting scene.
    Run {
        #[arg(long, default_value_t = 600)]
        ticks: u32,
        #[arg(long, default_value_t = 16.0)]
        interval_ms: f64,
        /// Start training before the first tick.
        #[arg(long)]
        training: bool,
    },
    /// Press on an entity, move the pointer through `--to` points, release.
    Drag {
        id: String,
        /// Pointer positions as `x,y`.
        #[arg(long, num_args = 1.., value_parser = parse_point)]
        to: Vec<Point>,
    },
    /// Report the entity under a surface point.
    Hit { x: f64, y: f64 },
    /// Emit one flow and report its endpoints.
    Emit {
        kind: FlowKind,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Switch the training cluster's instance type and report the new price.
    InstanceType { instance_type: String },
    /// Fire a control-panel scenario, then run a few ticks.
    Scenario {
        #[arg(value_enum)]
        name: Scenario,
        #[arg(long, default_value_t = 120)]
        ticks: u32,
    },
    /// List flow kinds with their animation parameters and routes.
    Kinds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    StartTraining,
    PauseTraining,
    StopTraining,
    Checkpoint,
    DataIngestion,
    Preprocessing,
    Failover,
    ValidateModel,
    DataValidation,
    SimulateFailure,
    HealthCheck,
    ScaleOut,
    ScaleIn,
    AddSpot,
    Reset,
}

fn main() -> Result<(), SimError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    if let Err(err) = dotenv {
        tracing::debug!(%err, "no .env loaded");
    }

    let cli = Cli::parse();
    let format = cli.format;
    let mut core = build_core(&cli)?;

    let report = match cli.command {
        Command::Run { ticks, interval_ms, training } => run(&mut core, ticks, interval_ms, training),
        Command::Drag { id, to } => drag(&mut core, &id, &to)?,
        Command::Hit { x, y } => probe(&core, Point::new(x, y)),
        Command::Emit { kind, from, to } => emit(&mut core, kind, from.as_deref(), to.as_deref()),
        Command::InstanceType { instance_type } => instance_type_report(&mut core, &instance_type),
        Command::Scenario { name, ticks } => scenario(&mut core, name, ticks),
        Command::Kinds => kinds(),
    };
    print_report(format, &report)
}

fn load_config(cli: &Cli) -> Result<EngineConfig, SimError> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| SimError::Read { path: path.clone(), source })?;
            EngineConfig::from_json(&raw)?
        }
        None => EngineConfig::from_env()?,
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn build_core(cli: &Cli) -> Result<EngineCore, SimError> {
    let config = load_config(cli)?;
    tracing::info!(seed = config.seed, width = cli.width, height = cli.height, "engine configured");
    let mut core = EngineCore::with_config(config);
    core.set_viewport(cli.width, cli.height, 1.0);
    core.load_default_architecture();
    Ok(core)
}

// =============================================================
// Commands
// =============================================================

fn run(core: &mut EngineCore, ticks: u32, interval_ms: f64, training: bool) -> Report {
    if training {
        core.start_training();
    }
    let mut peak = core.flows.len();
    let mut scene = core.scene();
    for i in 1..=ticks {
        scene = core.tick(interval_ms);
        peak = peak.max(scene.flows.len());
        if i % 60 == 0 {
            tracing::info!(now_ms = scene.now_ms, flows = scene.flows.len(), "tick");
        }
    }

    let mut text = format!(
        "t={:.0}ms flows={} peak={} training={} progress={:.1}%\n",
        scene.now_ms,
        scene.flows.len(),
        peak,
        scene.training,
        scene.training_progress
    );
    text.push_str(&entity_table(&scene));
    Report { text, json: json!({ "peak_flows": peak, "scene": scene }) }
}

/// Drag `id` by pressing at its center. Fails when an earlier entity covers
/// that point, since the press would grab the other one.
fn drag(core: &mut EngineCore, id: &str, path: &[Point]) -> Result<Report, SimError> {
    let start = core
        .entity(id)
        .map(|e| e.center())
        .ok_or_else(|| SimError::UnknownEntity(id.to_owned()))?;
    match hit::id_at(start, &core.registry) {
        Some(hit) if hit == id => {}
        Some(by) => return Err(SimError::Occluded { id: id.to_owned(), by }),
        None => return Err(SimError::UnknownEntity(id.to_owned())),
    }

    core.handle(PointerEvent::Down { x: start.x, y: start.y });
    for pt in path {
        core.handle(PointerEvent::Move { x: pt.x, y: pt.y });
    }
    core.handle(PointerEvent::Up);

    let end = core
        .entity(id)
        .map(|e| e.center())
        .ok_or_else(|| SimError::UnknownEntity(id.to_owned()))?;
    tracing::info!(%id, x = end.x, y = end.y, "drag finished");
    Ok(Report {
        text: format!("{id}: ({:.1}, {:.1}) -> ({:.1}, {:.1})", start.x, start.y, end.x, end.y),
        json: json!({ "id": id, "from": start, "to": end }),
    })
}

fn probe(core: &EngineCore, pt: Point) -> Report {
    let id = hit::id_at(pt, &core.registry);
    let text = match &id {
        Some(id) => format!("({:.1}, {:.1}) -> {id}", pt.x, pt.y),
        None => format!("({:.1}, {:.1}) -> nothing", pt.x, pt.y),
    };
    Report { text, json: json!({ "point": pt, "id": id }) }
}

fn emit(core: &mut EngineCore, kind: FlowKind, from: Option<&str>, to: Option<&str>) -> Report {
    let Some(id) = core.emit_flow(kind, from, to) else {
        return Report { text: format!("{kind}: not emitted"), json: json!({ "kind": kind, "flow": null }) };
    };
    match core.flows.get(&id) {
        Some(flow) => Report { text: format!("{kind}: {} -> {}", flow.from, flow.to), json: json!({ "kind": kind, "flow": flow }) },
        None => Report { text: format!("{kind}: not emitted"), json: json!({ "kind": kind, "flow": null }) },
    }
}

fn instance_type_report(core: &mut EngineCore, instance_type: &str) -> Report {
    match core.update_instance_type(instance_type) {
        Some(cost) => Report {
            text: format!("training cluster now {instance_type} at ${cost:.0}/hour"),
            json: json!({ "instance_type": instance_type, "cost_per_hour": cost }),
        },
        None => Report {
            text: "no training cluster to update".to_owned(),
            json: json!({ "instance_type": instance_type, "cost_per_hour": null }),
        },
    }
}

fn scenario(core: &mut EngineCore, name: Scenario, ticks: u32) -> Report {
    let summary = apply_scenario(core, name);
    tracing::info!(?name, %summary, "scenario applied");
    let mut scene = core.scene();
    for _ in 0..ticks {
        scene = core.tick(16.0);
    }
    let mut text = format!("{summary}\n");
    text.push_str(&entity_table(&scene));
    Report { text, json: json!({ "summary": summary, "scene": scene }) }
}

fn apply_scenario(core: &mut EngineCore, name: Scenario) -> String {
    match name {
        Scenario::StartTraining => format!("training started, {} flows", core.start_training()),
        Scenario::PauseTraining => format!("training paused, {} flows", core.pause_training()),
        Scenario::StopTraining => format!("training stopped, {} flows", core.stop_training()),
        Scenario::Checkpoint => format!("{} checkpoint flows", core.trigger_checkpoint()),
        Scenario::DataIngestion => format!("{} ingestion flows", core.trigger_data_ingestion()),
        Scenario::Preprocessing => format!("{} preprocessing flows", core.trigger_preprocessing()),
        Scenario::Failover => format!("{} failover flows", core.trigger_failover()),
        Scenario::ValidateModel => format!("{} validation flows", core.validate_model()),
        Scenario::DataValidation => format!("{} data validation flows", core.trigger_data_validation()),
        Scenario::SimulateFailure => match core.simulate_failure() {
            Some(id) => format!("{id} failed, recovery pending"),
            None => "no service to fail".to_owned(),
        },
        Scenario::HealthCheck => format!("{} monitoring flows", core.run_health_check()),
        Scenario::ScaleOut => format!("added {}", core.scale_out()),
        Scenario::ScaleIn => match core.scale_in() {
            Some(entity) => format!("removed {}", entity.id),
            None => "no scale-out instance to remove".to_owned(),
        },
        Scenario::AddSpot => format!("added {}", core.add_spot_instance()),
        Scenario::Reset => {
            core.reset();
            "reset to default architecture".to_owned()
        }
    }
}

fn kinds() -> Report {
    let mut text = String::new();
    let mut rows = Vec::new();
    for kind in FlowKind::ALL {
        let route = kind.route();
        text.push_str(&format!(
            "{:<16} speed={:<6} particles={} {} -> {}\n",
            kind.as_str(),
            kind.speed(),
            kind.particle_count(),
            route.from.join("|"),
            route.to.join("|"),
        ));
        rows.push(json!({
            "kind": kind,
            "speed": kind.speed(),
            "particles": kind.particle_count(),
            "color": kind.color(),
            "data_size": kind.data_size(),
            "from": route.from,
            "to": route.to,
        }));
    }
    Report { text, json: Value::Array(rows) }
}

// =============================================================
// Output
// =============================================================

struct Report {
    text: String,
    json: Value,
}

fn print_report(format: Format, report: &Report) -> Result<(), SimError> {
    match format {
        Format::Text => println!("{}", report.text.trim_end()),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report.json)?),
    }
    Ok(())
}

fn entity_table(scene: &Scene) -> String {
    scene
        .entities
        .iter()
        .map(|e| format!("{:<24} x={:>7.1} y={:>7.1} activity={:.2}\n", e.id, e.x, e.y, e.activity))
        .collect()
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{raw}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x in `{raw}`: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y in `{raw}`: {e}"))?;
    Ok(Point::new(x, y))
}
