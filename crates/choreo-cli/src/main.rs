use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use choreo_core::ChoreoConfig;
use choreo_ir::{validate_script, GlyphMeasure, SceneScript, Sequencer};

#[derive(Parser)]
#[command(
    name = "choreo",
    version,
    about = "Choreo: relative layout and step choreography for explanatory animations",
    long_about = "Choreo lays out text, formulas, and shapes relative to one another,\nplays a script of show/transform/highlight/hide steps against them,\nand emits a deterministic render instruction stream for any renderer."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scene script and emit its render instruction stream
    Run {
        /// Path to the JSON scene script
        file: PathBuf,

        /// TOML config used when the script embeds none
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the stream here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON stream
        #[arg(long)]
        pretty: bool,
    },

    /// Statically check a scene script without laying it out
    Check {
        /// Path to the JSON scene script
        file: PathBuf,
    },

    /// Write a default choreo.toml
    InitConfig {
        /// Destination path
        #[arg(default_value = "choreo.toml")]
        path: PathBuf,
    },

    /// Show engine info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout may carry the instruction stream, so logs always go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            file,
            config,
            output,
            pretty,
        } => cmd_run(&file, config.as_deref(), output.as_deref(), pretty),
        Commands::Check { file } => cmd_check(&file),
        Commands::InitConfig { path } => cmd_init_config(&path),
        Commands::Info => cmd_info(),
    }
}

fn load_script(file: &Path) -> Result<SceneScript> {
    SceneScript::load(file).with_context(|| format!("failed to load script: {}", file.display()))
}

/// Script-embedded config wins over `--config`, which wins over defaults.
fn resolve_config(script: &SceneScript, config_path: Option<&Path>) -> Result<ChoreoConfig> {
    if let Some(config) = &script.config {
        if config_path.is_some() {
            tracing::warn!("script embeds a config; --config ignored");
        }
        return Ok(config.clone());
    }
    match config_path {
        Some(path) => ChoreoConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(ChoreoConfig::default()),
    }
}

fn cmd_run(file: &Path, config_path: Option<&Path>, output: Option<&Path>, pretty: bool) -> Result<()> {
    let start = Instant::now();
    let script = load_script(file)?;
    let config = resolve_config(&script, config_path)?;
    tracing::info!(
        steps = script.len(),
        width = config.stage.width,
        height = config.stage.height,
        "playing {}",
        file.display()
    );

    let measure = GlyphMeasure::new(config.measure.clone());
    let mut sequencer = Sequencer::from_config(&config, measure)?;
    sequencer
        .play(script.steps)
        .with_context(|| format!("scene {} halted", file.display()))?;

    let stream = sequencer.take_stream();
    let hash = stream.content_hash()?;
    let json = if pretty {
        serde_json::to_string_pretty(&stream)?
    } else {
        serde_json::to_string(&stream)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write stream: {}", path.display()))?;
            eprintln!("   ✓ Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    tracing::info!(
        instructions = stream.len(),
        duration = stream.total_duration().as_seconds(),
        frames = stream.frame_count(),
        hash = %hash,
        "scene complete in {:.1}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

fn cmd_check(file: &Path) -> Result<()> {
    println!("Checking {}", file.display());

    let script = load_script(file)?;
    println!("   ✓ Parse OK ({} steps)", script.len());

    validate_script(&script.steps).map_err(|issues| {
        let msgs: Vec<String> = issues.into_iter().map(|i| i.to_string()).collect();
        anyhow::anyhow!("Validation errors:\n  {}", msgs.join("\n  "))
    })?;
    println!("   ✓ Validate OK");

    println!();
    println!("   No errors found.");
    Ok(())
}

fn cmd_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("'{}' already exists", path.display());
    }
    ChoreoConfig::default()
        .save_to_file(path)
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    println!("   ✓ Created {}", path.display());
    Ok(())
}

fn cmd_info() -> Result<()> {
    let config = ChoreoConfig::default();
    println!("Choreo scene engine");
    println!("   Version:   {}", env!("CARGO_PKG_VERSION"));
    println!(
        "   Stage:     {}x{} @ {} fps",
        config.stage.width, config.stage.height, config.stage.fps
    );
    println!("   Run time:  {}s per animated step", config.timing.default_run_time);
    println!("   Measure:   glyph heuristic ({}px font)", config.measure.font_size);
    println!("   Scripts:   JSON (show, transform, highlight, hide, pause, group)");
    Ok(())
}
