//! musicbox: plays an algorithmically generated multi-track arrangement.
//!
//! Usage:
//!   musicbox --patterns patterns --tempo 100 --seed 7
//!   musicbox --config musicbox.toml --render

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mb_master::{ArrangementConfig, Controller, NoteEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "musicbox")]
#[command(about = "Algorithmic multi-track arrangement generator and player")]
struct Cli {
    /// Arrangement config (TOML); the stock layout if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding pattern and chord files
    #[arg(short, long)]
    patterns: Option<PathBuf>,

    /// Tempo in beats per minute
    #[arg(short, long)]
    tempo: Option<u32>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Arrangement cycles to play
    #[arg(short, long)]
    runs: Option<u32>,

    /// Print the whole event timeline instead of playing in real time
    #[arg(long)]
    render: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ArrangementConfig::load(path)?,
        None => ArrangementConfig::default(),
    };
    let mut ctrl = Controller::with_config(config)?;
    if let Some(dir) = cli.patterns {
        ctrl.set_patterns_dir(dir);
    }
    if let Some(bpm) = cli.tempo {
        ctrl.set_tempo(bpm)?;
    }
    if let Some(seed) = cli.seed {
        ctrl.set_seed(seed);
    }
    if let Some(runs) = cli.runs {
        ctrl.set_runs(runs);
    }

    let cfg = ctrl.config();
    info!(
        tempo = cfg.tempo,
        seed = cfg.seed,
        runs = cfg.runs,
        patterns = %cfg.patterns_dir.display(),
        "musicbox"
    );

    if cli.render {
        render(&ctrl);
    } else {
        play(&mut ctrl);
    }
    Ok(())
}

fn render(ctrl: &Controller) {
    let events = ctrl.render_events();
    for event in &events {
        print_event(event);
    }
    println!("{} events", events.len());
}

fn play(ctrl: &mut Controller) {
    ctrl.start();
    println!("Playing...");

    while ctrl.is_playing() {
        for event in ctrl.drain_events() {
            print_event(&event);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    for event in ctrl.drain_events() {
        print_event(&event);
    }

    println!("Done.");
}

fn print_event(event: &NoteEvent) {
    let pitch = match event.pitch {
        Some(p) => format!("{:>4}", p),
        None => "rest".to_string(),
    };
    println!(
        "{:>10.1} ms  {:<6} {}  {:>7.1} ms",
        event.at_ms, event.track, pitch, event.duration_ms
    );
}
