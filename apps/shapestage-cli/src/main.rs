use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use glam::Vec3;
use shapestage_assets::GltfMetadataLoader;
use shapestage_common::{ShapeDraft, ShapeId, ShapeKind, ShapeSpec};
use shapestage_input::KeyEdge;
use shapestage_remote::{HttpShapeStore, MemoryShapeStore, ShapeStore};
use shapestage_render::DebugTextRenderer;
use shapestage_stage::{ConfigOverrides, Stage, StageConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shapestage",
    version,
    about = "Inspect and edit remote shapes, or run a headless stage"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Stage configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the shape store; overrides the config file
    #[arg(long, env = "SHAPESTAGE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every stored shape
    List,
    /// Create a shape
    Add {
        /// box, sphere, torus, or the numeric type
        kind: ShapeKind,
        /// Position as x,y,z
        #[arg(long, default_value = "0,0,0", value_parser = parse_vec3)]
        at: Vec3,
        /// Parameter object as JSON, e.g. '{"radius": 5}'
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Delete a shape by id
    Remove { id: i64 },
    /// Print the effective configuration
    ShowConfig,
    /// Run the stage without a window and print the last frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Key script: FRAME:KEY:down|up, comma separated (e.g. 0:KeyW:down,30:KeyW:up)
        #[arg(long, default_value = "")]
        keys: String,
        /// Use an in-memory store instead of the remote one
        #[arg(long)]
        offline: bool,
        /// Seconds to wait for the initial fetch and model loads
        #[arg(long, default_value = "10")]
        settle_secs: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => StageConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StageConfig::default(),
    };
    config.apply_overrides(&ConfigOverrides {
        base_url: cli.base_url.clone(),
    });

    match cli.command {
        Commands::List => {
            let store = http_store(&config)?;
            let records = runtime()?.block_on(store.list()).context("failed to list shapes")?;
            println!("{} shapes", records.len());
            for record in records {
                println!(
                    "  {} {:<6} at ({:.2}, {:.2}, {:.2}) {} {}",
                    record.id,
                    record.kind,
                    record.x,
                    record.y,
                    record.z,
                    record.params_json,
                    record.created_at
                );
            }
        }
        Commands::Add { kind, at, params } => {
            let params: serde_json::Value =
                serde_json::from_str(&params).context("--params is not valid JSON")?;
            if !params.is_object() {
                bail!("--params must be a JSON object");
            }
            // Catch values the stage would refuse to draw before storing them.
            ShapeSpec::parse(kind, &params).context("shape parameters are invalid")?;
            let store = http_store(&config)?;
            let record = runtime()?
                .block_on(store.create(&ShapeDraft::new(kind, at, params)))
                .context("failed to create shape")?;
            println!("created {} ({})", record.id, record.kind);
        }
        Commands::Remove { id } => {
            let store = http_store(&config)?;
            runtime()?
                .block_on(store.delete(ShapeId(id)))
                .with_context(|| format!("failed to delete shape {id}"))?;
            println!("deleted {}", ShapeId(id));
        }
        Commands::ShowConfig => {
            print!(
                "{}",
                serde_yaml::to_string(&config).context("failed to format configuration")?
            );
        }
        Commands::Simulate {
            frames,
            dt,
            keys,
            offline,
            settle_secs,
        } => {
            let script = parse_key_script(&keys)?;
            let settle = Duration::from_secs(settle_secs);
            let output = if offline {
                simulate(config, MemoryShapeStore::new(), frames, dt, &script, settle)?
            } else {
                let store = http_store(&config)?;
                simulate(config, store, frames, dt, &script, settle)?
            };
            print!("{output}");
        }
    }

    Ok(())
}

fn http_store(config: &StageConfig) -> Result<HttpShapeStore> {
    HttpShapeStore::new(&config.remote).context("failed to build HTTP client")
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn simulate<S: ShapeStore + 'static>(
    config: StageConfig,
    store: S,
    frames: u64,
    dt: f32,
    script: &[(u64, KeyEdge)],
    settle: Duration,
) -> Result<String> {
    let loader = Arc::new(GltfMetadataLoader::new());
    let mut stage = Stage::new(config, store, loader, DebugTextRenderer::new())
        .context("failed to start sync worker")?;
    stage.start();
    if !stage.settle(settle) {
        tracing::warn!("background work still pending after {settle:?}");
    }

    let mut output = String::new();
    for frame in 0..frames {
        for (_, edge) in script.iter().filter(|(at, _)| *at == frame) {
            stage.push_key(edge.clone());
        }
        output = stage.frame(dt);
    }

    let state = stage.character();
    output.push_str(&format!(
        "Character: {:?} at ({:.2}, {:.2}, {:.2}) heading {:.2}\n",
        state.stance, state.position.x, state.position.y, state.position.z, state.heading
    ));
    output.push_str(&format!("Status: {}\n", stage.status()));
    output.push_str(&format!("Frames: {}\n", stage.frame_stats()));
    stage.shutdown();
    Ok(output)
}

fn parse_vec3(raw: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = raw
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate in {raw:?}: {e}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {raw:?}")),
    }
}

fn parse_key_script(raw: &str) -> Result<Vec<(u64, KeyEdge)>> {
    let mut script = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let fields: Vec<&str> = entry.split(':').collect();
        let [frame, key, phase] = fields.as_slice() else {
            bail!("key script entry {entry:?} is not FRAME:KEY:down|up");
        };
        let frame: u64 = frame
            .parse()
            .with_context(|| format!("bad frame number in {entry:?}"))?;
        let edge = match *phase {
            "down" => KeyEdge::down(*key),
            "up" => KeyEdge::up(*key),
            other => bail!("unknown key phase {other:?} in {entry:?}"),
        };
        script.push((frame, edge));
    }
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn vec3_parses() {
        assert_eq!(parse_vec3("10, 0,-2.5").unwrap(), Vec3::new(10.0, 0.0, -2.5));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn key_script_parses() {
        let script = parse_key_script("0:KeyW:down, 30:KeyW:up").unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script[0], (0, KeyEdge::down("KeyW")));
        assert_eq!(script[1], (30, KeyEdge::up("KeyW")));
        assert!(parse_key_script("").unwrap().is_empty());
        assert!(parse_key_script("0:KeyW").is_err());
        assert!(parse_key_script("0:KeyW:held").is_err());
    }

    #[test]
    fn offline_simulation_runs() {
        let script = parse_key_script("0:KeyW:down,10:KeyW:up").unwrap();
        let output = simulate(
            StageConfig::default(),
            MemoryShapeStore::new(),
            20,
            0.1,
            &script,
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(output.contains("Character: Idle at (0.00, 0.00, 10.00)"));
        assert!(output.contains("Status: loaded 0 shapes"));
    }
}
