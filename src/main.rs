//! VR Tools - scene-authoring panels on the command line
//!
//! Each panel is a subcommand operating on a JSON stage file.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use vrtools::audit;
use vrtools::config::Config;
use vrtools::error::VrError;
use vrtools::host::{SceneHost, Stage};
use vrtools::matcher::MatchResult;
use vrtools::review::{ReviewAction, ReviewSession};
use vrtools::tools::{
    Axis, BatchRename, Direction, ExternalConverter, MaterialAssign, MaterialMatch,
    MaterialOutput, RenameMode, Turntable, UsdConverter,
};
use vrtools::utils::closest_match;

/// Turntable frame rate
const FRAMES_PER_SECOND: u64 = 60;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stage file to operate on
    #[arg(short, long, global = true)]
    stage: Option<PathBuf>,

    /// Replace the saved selection (repeat for several prims)
    #[arg(long, global = true)]
    select: Vec<String>,

    /// Save the modified stage here instead of over the input
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a prefix or suffix to every selected prim
    Rename {
        text: String,
        /// prefix or suffix (config default when omitted)
        #[arg(long)]
        mode: Option<RenameMode>,
    },
    /// Record the material of one prim and assign it to the selection
    Assign {
        #[arg(long)]
        from: String,
    },
    /// Select every prim sharing the first selected prim's material
    SelectBound,
    /// Match materials to replacements by name
    Match {
        /// Container holding the materials to replace
        #[arg(long)]
        materials: String,
        /// Container holding the replacement materials
        #[arg(long)]
        replace: String,
        /// Force a pairing, e.g. Leather_Seat=Metal_Trim (or =None)
        #[arg(long = "override", value_name = "SRC=DST")]
        overrides: Vec<String>,
        /// Review the proposals on stdin before committing
        #[arg(short, long)]
        interactive: bool,
        /// Rebind without review
        #[arg(long)]
        commit: bool,
    },
    /// Export material -> bound object names as JSON
    Export {
        /// Container holding the materials (first selected prim when omitted)
        #[arg(long)]
        looks: Option<String>,
        file: PathBuf,
    },
    /// Convert an FBX file next to itself
    Convert { source: String },
    /// Turntable-spin a prim
    Spin {
        prim: String,
        #[arg(long)]
        axis: Option<Axis>,
        /// Degrees per frame (0.1 - 1.0)
        #[arg(long)]
        speed: Option<f64>,
        /// Spin clockwise
        #[arg(long)]
        right: bool,
        #[arg(long, default_value_t = 120)]
        frames: u32,
    },
    /// Revert the last committed edit
    Undo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Setup logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config.tracing_level()
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("VR Tools v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args, config).await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Args, config: Config) -> Result<()> {
    // The converter works on files, not the stage
    if let Command::Convert { source } = &args.command {
        return convert(&config, source).await;
    }

    let Some(stage_path) = args.stage.clone() else {
        bail!("--stage is required for this command");
    };
    let mut stage = Stage::load(&stage_path)
        .with_context(|| format!("loading stage {:?}", stage_path))?;

    if !args.select.is_empty() {
        stage.set_selection(args.select.clone());
    }

    let changed = match args.command {
        Command::Rename { text, mode } => {
            let mode = mode.unwrap_or(config.rename_mode);
            let renames = BatchRename::new(mode, &text).run(&mut stage)?;
            for (from, to) in &renames {
                println!("{} -> {}", from, to);
            }
            if renames.is_empty() {
                info!("Nothing to rename");
            } else {
                record(&config, &format!("Batch Rename: {} prim(s) with '{}'", renames.len(), text));
            }
            !renames.is_empty()
        }
        Command::Assign { from } => {
            let targets = stage.selected_paths();
            stage.set_selection(vec![from.clone()]);

            let mut tool = MaterialAssign::new();
            if tool.record(&stage)?.is_none() {
                bail!("{} has no material binding", from);
            }

            stage.set_selection(targets);
            let count = tool.assign(&mut stage)?;
            println!("{} -> {} prim(s)", tool.status(), count);
            record(&config, &format!("Assign Material: {} to {} prim(s)", tool.status(), count));
            true
        }
        Command::SelectBound => {
            let selected = MaterialAssign::new().select_bound_objects(&mut stage)?;
            for path in &selected {
                println!("{}", path);
            }
            true
        }
        Command::Match {
            materials,
            replace,
            overrides,
            interactive,
            commit,
        } => {
            let tool = MaterialMatch::new(&materials, &replace);
            let mut result = tool
                .run(&stage)
                .map_err(|e| with_suggestion(&stage, e))?;

            for pair in &overrides {
                let (source, value) = pair
                    .split_once('=')
                    .with_context(|| format!("override '{}' is not SRC=DST", pair))?;
                result.apply_override(source.trim(), value.trim())?;
            }

            let result = if interactive {
                review(result).await?
            } else {
                for (source, choice) in result.mapping() {
                    println!("{} -> {}", source, choice);
                }
                commit.then_some(result)
            };

            match result {
                Some(result) => {
                    let rebinds = tool.commit(&mut stage, result)?;
                    for rebind in &rebinds {
                        println!(
                            "{} -> {} ({} prim(s))",
                            rebind.from,
                            rebind.to,
                            rebind.objects.len()
                        );
                    }
                    record(
                        &config,
                        &format!("Material Match: {} rebind(s) from {}", rebinds.len(), materials),
                    );
                    true
                }
                None => false,
            }
        }
        Command::Export { looks, file } => {
            let output = match looks {
                Some(looks) => MaterialOutput::new(&looks),
                None => {
                    let mut output = MaterialOutput::default();
                    if !output.set_looks_path_from_selection(&stage) {
                        bail!("Select the looks container or pass --looks");
                    }
                    output
                }
            };
            let written = output
                .export(&stage, &file, &config.export_extension)
                .map_err(|e| with_suggestion(&stage, e))?;
            println!("{}", written.display());
            false
        }
        Command::Spin {
            prim,
            axis,
            speed,
            right,
            frames,
        } => {
            spin(&mut stage, &config, &prim, axis, speed, right, frames).await?;
            true
        }
        Command::Undo => match stage.undo() {
            Some(label) => {
                println!("Undid {}", label);
                record(&config, &format!("Undo: {}", label));
                true
            }
            None => {
                warn!("Nothing to undo");
                false
            }
        },
        Command::Convert { .. } => false,
    };

    if changed {
        let target = args.output.as_deref().unwrap_or(&stage_path);
        save(&stage, target)?;
    }
    Ok(())
}

fn save(stage: &Stage, path: &Path) -> Result<()> {
    stage
        .save(path)
        .with_context(|| format!("saving stage {:?}", path))?;
    debug!("Saved stage {:?}", path);
    Ok(())
}

/// Append to the audit log when enabled
fn record(config: &Config, entry: &str) {
    if !config.audit_log {
        return;
    }
    if let Err(e) = audit::log(entry) {
        warn!("Could not write audit log: {}", e);
    }
}

/// Point at the closest existing prim when a container path is wrong
fn with_suggestion(stage: &Stage, e: VrError) -> anyhow::Error {
    if let VrError::PrimNotFound(path) = &e {
        if let Some(suggestion) = closest_match(path, &stage.traverse(), 0.6) {
            warn!("💡 Did you mean {}?", suggestion.value);
        }
    }
    e.into()
}

/// Edit a match result with commands read from stdin
async fn review(result: MatchResult) -> Result<Option<MatchResult>> {
    let mut session = ReviewSession::new(result);
    println!("{}", session.render_page());
    println!("Commands: <row> <name|number>, next, previous, list, commit, cancel");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while session.is_active() {
        let Some(line) = lines.next_line().await? else {
            info!("Input closed, discarding review");
            break;
        };

        match session.handle_command(&line) {
            ReviewAction::Updated(_)
            | ReviewAction::NextPage
            | ReviewAction::PreviousPage
            | ReviewAction::ShowPage => println!("{}", session.render_page()),
            ReviewAction::Rejected(reason) => println!("{}", reason),
            ReviewAction::NotRecognized => println!("Unknown command: {}", line.trim()),
            ReviewAction::Commit | ReviewAction::Cancelled => {}
        }
    }

    Ok(session.finish())
}

async fn spin(
    stage: &mut Stage,
    config: &Config,
    prim: &str,
    axis: Option<Axis>,
    speed: Option<f64>,
    right: bool,
    frames: u32,
) -> Result<()> {
    let mut turntable = Turntable::new(
        prim,
        axis.unwrap_or(config.rotate_axis),
        speed.unwrap_or_else(|| config.clamped_rotate_speed()),
    );
    let direction = if right { Direction::Right } else { Direction::Left };
    turntable.start(&*stage, direction)?;

    let mut interval = tokio::time::interval(Duration::from_micros(1_000_000 / FRAMES_PER_SECOND));
    for _ in 0..frames {
        interval.tick().await;
        turntable.tick(&mut *stage)?;
    }
    turntable.stop();

    println!("{} at {:.1} deg", prim, turntable.angle());
    Ok(())
}

async fn convert(config: &Config, source: &str) -> Result<()> {
    let converter = ExternalConverter::new(&config.converter_program, &config.converter_args);
    let panel = UsdConverter::new(Arc::new(converter), &config.converter_output_extension);

    let handle = panel.start(source)?;
    let mut progress = handle.subscribe();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let state = *progress.borrow();
            if state.busy {
                debug!("Converting... {:.0}%", state.fraction * 100.0);
            }
        }
    });

    let output = handle.wait().await?;
    watcher.abort();
    println!("{}", output.display());
    Ok(())
}
