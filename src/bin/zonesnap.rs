use std::path::PathBuf;
use std::process;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use zonesnap::actor::reactor::{self, Event, Reactor, Record};
use zonesnap::common::config::{Config, config_file};
use zonesnap::common::log;
use zonesnap::layout_engine::{self as layout, BuiltinPreset, detect_boundaries};
use zonesnap::sys::geometry::Rect;
use zonesnap::sys::window::{SimulatedWindows, WindowFrameAccessor};
use zonesnap::ui::LoggingOverlay;

#[derive(Parser)]
#[command(name = "zonesnap")]
#[command(about = "Modifier-triggered window snapping into screen zones")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.zonesnap.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in and custom presets
    Presets,
    /// Print the zones and boundaries a preset produces on a screen
    Zones {
        /// Preset id; defaults to the configured default preset
        #[arg(long)]
        preset: Option<String>,
        /// Screen as WIDTHxHEIGHT or WIDTHxHEIGHT+X+Y, bottom-left origin
        #[arg(long, default_value = "1920x1080", value_parser = parse_screen)]
        screen: Rect,
        /// Gap between zones; defaults to the configured gap
        #[arg(long)]
        gap: Option<f64>,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
    /// Run a recorded event stream against simulated windows and print the
    /// resulting snapped windows
    Replay {
        file: PathBuf,
        /// Record the replayed events again to this path
        #[arg(long)]
        record: Option<PathBuf>,
        /// Move the real windows through the accessibility API instead of
        /// simulating them (macOS only)
        #[arg(long)]
        live: bool,
    },
    /// Check the accessibility permission
    #[cfg(target_os = "macos")]
    Permissions {
        /// Prompt and wait until permission is granted
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Validate the config file
    Check {
        /// Write back values that were out of range
        #[arg(long)]
        fix: bool,
    },
    /// Print the default config
    Default,
}

fn parse_screen(s: &str) -> Result<Rect, String> {
    let (size, origin) = match s.split_once('+') {
        Some((size, origin)) => (size, Some(origin)),
        None => (s, None),
    };
    let number = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
    let (w, h) = size.split_once('x').ok_or_else(|| format!("expected WIDTHxHEIGHT, got {size:?}"))?;
    let (x, y) = match origin {
        Some(origin) => {
            let (x, y) = origin.split_once('+').ok_or_else(|| format!("expected +X+Y, got {origin:?}"))?;
            (number(x)?, number(y)?)
        }
        None => (0.0, 0.0),
    };
    let rect = Rect::from_xywh(x, y, number(w)?, number(h)?);
    if rect.is_empty() {
        return Err(format!("screen {s:?} has no area"));
    }
    Ok(rect)
}

/// Windows come into existence as the recording first mentions them.
fn simulated_windows(events: &[Event]) -> SimulatedWindows {
    let windows = SimulatedWindows::new();
    for event in events {
        match event {
            Event::DragStarted { window: Some(info), .. } => {
                if windows.get(info.window).is_none() {
                    windows.insert(info.window, info.initial_frame());
                }
            }
            Event::WindowFrameChanged { window, frame } => {
                if windows.get(*window).is_none() {
                    windows.insert(*window, *frame);
                }
            }
            _ => {}
        }
    }
    windows
}

#[cfg(target_os = "macos")]
fn live_accessor() -> anyhow::Result<Box<dyn WindowFrameAccessor>> {
    use zonesnap::sys::ax::AxWindowAccessor;
    let accessor = AxWindowAccessor::new();
    if !accessor.is_permission_granted() {
        bail!("accessibility permission not granted; run `zonesnap permissions --wait`");
    }
    Ok(Box::new(accessor))
}

#[cfg(not(target_os = "macos"))]
fn live_accessor() -> anyhow::Result<Box<dyn WindowFrameAccessor>> {
    bail!("--live needs the macOS accessibility API")
}

fn main() {
    let cli = Cli::parse();
    log::init_logging(if cli.verbose { "debug" } else { "info" });
    if let Err(err) = run(cli) {
        eprintln!("zonesnap: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config_file);
    let load = || {
        Config::load_or_default(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))
    };
    match cli.command {
        Commands::Presets => {
            let config = load()?;
            for preset in BuiltinPreset::all() {
                println!("{:<16} {} ({} zones)", preset.id(), preset.display_name(), preset.zones().len());
            }
            for preset in &config.custom_presets {
                println!("{:<16} {} ({} zones, custom)", preset.id, preset.name, preset.zones.len());
            }
        }
        Commands::Zones { preset, screen, gap } => {
            let config = load()?;
            let library = config.preset_library();
            let id = preset.unwrap_or_else(|| config.settings.default_preset.clone());
            let Some(preset) = library.get(&id) else {
                bail!("unknown preset {id:?}");
            };
            let zones = layout::generate(&preset, screen, gap.unwrap_or(config.settings.gap));
            println!("{}", serde_json::to_string_pretty(&zones)?);
            println!("{}", serde_json::to_string_pretty(&detect_boundaries(&zones))?);
        }
        Commands::Config { config_cmd: ConfigCommands::Default } => {
            print!("{}", toml::to_string_pretty(&Config::default())?);
        }
        Commands::Config { config_cmd: ConfigCommands::Check { fix } } => {
            let mut config = load()?;
            let issues = config.validate();
            for issue in &issues {
                println!("{issue}");
            }
            if fix {
                let fixed = config.auto_fix_values();
                if fixed > 0 {
                    config.save(&config_path)?;
                    println!("fixed {fixed} value(s) in {}", config_path.display());
                }
            } else if !issues.is_empty() {
                bail!("{} problem(s) in {}", issues.len(), config_path.display());
            } else {
                println!("{} is valid", config_path.display());
            }
        }
        Commands::Replay { file, record, live } => {
            let config = load()?;
            let events = reactor::read_recording(&file)?;
            let record = Record::new(record.as_deref())?;
            let accessor: Box<dyn WindowFrameAccessor> =
                if live { live_accessor()? } else { Box::new(simulated_windows(&events)) };
            let mut reactor = Reactor::new(config, accessor, Box::new(LoggingOverlay::default()), record);
            let count = events.len();
            for event in events {
                reactor.handle_event(event);
            }
            info!(count, live, "replayed");
            let snapped: Vec<_> = reactor.registry().iter().collect();
            println!("{}", serde_json::to_string_pretty(&snapped)?);
        }
        #[cfg(target_os = "macos")]
        Commands::Permissions { wait } => {
            use zonesnap::sys::accessibility::{PermissionPoller, is_trusted, prompt};
            if is_trusted() {
                println!("accessibility permission granted");
                return Ok(());
            }
            if !wait {
                bail!("accessibility permission not granted");
            }
            prompt();
            println!("waiting for accessibility permission...");
            if !PermissionPoller::for_accessibility(|| {})?.wait() {
                bail!("stopped waiting for accessibility permission");
            }
            println!("accessibility permission granted");
        }
    }
    Ok(())
}
