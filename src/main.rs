use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use stellar_map::camera::{MapBounds, Point};
use stellar_map::config::{ConfigError, MapConfig};
use stellar_map::engine::MapController;
use stellar_map::generator::SeededGenerator;
use stellar_map::object::{MapObject, ObjectFeed, Target};
use stellar_map::reveal::Seed;
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Parser, Debug)]
#[command(name = "stellar-map", about = "Inspect stellar map reveal and pointer resolution")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reveal chunks with the seeded generator and print the reports and statistics.
    Reveal(RevealArgs),
    /// Resolve selection and hover for a pointer position against a JSON feed.
    Pick(PickArgs),
}

#[derive(Args, Debug)]
struct RevealArgs {
    #[arg(long, env = "STELLAR_MAP_SEED", default_value_t = 0)]
    seed: Seed,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    y: f64,
    #[arg(long, default_value_t = 1)]
    radius: u32,
    /// Reveal the same neighborhood this many times.
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

#[derive(Args, Debug)]
struct PickArgs {
    /// JSON array of map objects.
    #[arg(long)]
    feed: PathBuf,
    /// Pointer x in screen pixels.
    #[arg(long, allow_negative_numbers = true)]
    x: f64,
    /// Pointer y in screen pixels.
    #[arg(long, allow_negative_numbers = true)]
    y: f64,
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    center_x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    center_y: f64,
    #[arg(long, default_value_t = 800.0)]
    width: f64,
    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = MapConfig::from_env()?;

    match cli.command {
        Command::Reveal(args) => run_reveal(config, args).await,
        Command::Pick(args) => run_pick(config, args),
    }
}

async fn run_reveal(config: MapConfig, args: RevealArgs) -> Result<(), CliError> {
    let mut controller = MapController::new(config);
    controller.set_seed(args.seed).await;
    let generator = SeededGenerator::new(config.chunk_size);
    let center = Point::new(args.x, args.y);

    let mut reports = Vec::new();
    for _ in 0..args.repeat.max(1) {
        reports.push(controller.reveal_at(&generator, center, args.radius).await);
    }
    info!(seed = args.seed, runs = reports.len(), "reveal complete");

    print_json(&json!({
        "seed": args.seed,
        "reports": reports,
        "statistics": controller.statistics(),
    }))
}

fn run_pick(config: MapConfig, args: PickArgs) -> Result<(), CliError> {
    let raw = fs::read_to_string(&args.feed).map_err(|source| CliError::Read { path: args.feed.clone(), source })?;
    let objects: Vec<MapObject> = serde_json::from_str(&raw)?;
    info!(path = %args.feed.display(), objects = objects.len(), "feed loaded");

    let mut controller = MapController::new(config);
    controller.set_viewport(MapBounds::new(0.0, 0.0, args.width, args.height));
    controller.set_feed(ObjectFeed::from_objects(objects));
    controller.open();
    controller.jump_to(Point::new(args.center_x, args.center_y), args.zoom);

    let pointer = Point::new(args.x, args.y);
    controller.on_pointer_move(pointer);
    let click = controller.on_click(pointer);
    let world = controller.transform().screen_to_world(pointer);

    print_json(&json!({
        "pointer": pointer,
        "world": world,
        "zoom": controller.view().zoom_level(),
        "handled": click.handled,
        "selection": describe(&controller, controller.selection()),
        "hover": describe(&controller, controller.hover()),
        "cursor": controller.cursor(),
    }))
}

fn describe(controller: &MapController, target: Option<Target>) -> Value {
    match target.and_then(|t| controller.feed().get(&t)) {
        Some(obj) => json!(obj),
        None => Value::Null,
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
