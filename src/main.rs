mod alert;
mod headless;
mod pacing;
mod settings;
mod timer;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};

use crate::alert::SoundAlert;
use crate::settings::load_settings;
use crate::timer::duration::parse_duration;

#[derive(Parser, Debug)]
#[command(
    name = "countdown",
    version,
    about = "Desktop countdown timer with start, pause and reset controls"
)]
struct Cli {
    /// JSON settings file; defaults are used when it does not exist
    #[arg(long, default_value = "countdown.json")]
    settings: PathBuf,

    /// Initial duration (SS, MM:SS or HH:MM:SS), overriding default_input
    #[arg(long, allow_hyphen_values = true)]
    duration: Option<String>,

    /// Normalize a duration, print it as HH:MM:SS and exit
    #[arg(
        long,
        value_name = "TEXT",
        allow_hyphen_values = true,
        conflicts_with = "headless"
    )]
    parse: Option<String>,

    /// Run the countdown in the terminal instead of opening a window
    #[arg(long)]
    headless: bool,

    #[arg(long)]
    no_sound: bool,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long, default_value_t = 1_000, hide = true)]
    tick_ms: u64,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(text) = cli.parse.as_deref() {
        let duration = parse_duration(text)?;
        println!("{}", duration.canonical());
        return Ok(());
    }

    if cli.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }
    let tick_step = Duration::from_millis(cli.tick_ms);

    let mut settings = load_settings(&cli.settings)
        .with_context(|| format!("failed to load {}", cli.settings.display()))?;
    if cli.no_sound {
        settings.alert.sound_enabled = false;
    }
    let initial_input = cli
        .duration
        .clone()
        .unwrap_or_else(|| settings.default_input.clone());
    debug!("settings: {settings:?}");

    if cli.headless {
        let sound = SoundAlert::from_settings(&settings.alert);
        return crate::headless::run_headless(&initial_input, sound, tick_step);
    }

    info!("opening countdown window with {initial_input}");
    ui::app::run_gui(settings, cli.settings, initial_input, tick_step)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("countdown={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
