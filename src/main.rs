// SPDX-License-Identifier: MIT
//
// halfblock: pixel graphics in the terminal at twice the vertical resolution.
//
// The binary wires the crates together:
//
//   hb-term   → palette colors, frame buffer, diff renderer, input, event loop
//   hb-canvas → half-block pixel canvas, shapes, text overlays, compositor
//
// `Demo` implements hb-term's App trait. Each frame:
//
//   stdin → parser → on_event → InputTracker
//   paint → snapshot → scene update → scene draw → canvas composite
//         → frame buffer → diff renderer → terminal

mod config;
mod entity;
mod input_state;
mod scene;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use hb_canvas::Canvas;
use hb_term::buffer::FrameBuffer;
use hb_term::color::ColorValue;
use hb_term::event_loop::{Action, App, EventLoop};
use hb_term::input::{Event, KeyCode};

use crate::config::{Config, Overrides};
use crate::input_state::InputTracker;
use crate::scene::Scene;

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "halfblock", version, about)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/halfblock/halfblock.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Target frames per second (1-240)
    #[arg(long, value_name = "N")]
    fps: Option<u32>,

    /// Canvas background, e.g. `default`, `gray:3`, `rgb:0,0,1`, `#102030`
    #[arg(long, value_name = "COLOR")]
    background: Option<ColorValue>,

    /// Write logs here (filter with RUST_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Disable mouse reporting
    #[arg(long)]
    no_mouse: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            frame_rate: self.fps,
            background: self.background,
            log_file: self.log_file.clone(),
            no_mouse: self.no_mouse,
        }
    }
}

// ─── Demo ───────────────────────────────────────────────────────────────────

struct Demo {
    canvas: Canvas,
    scene: Scene,
    input: InputTracker,
    quit_key: char,
    dt: Duration,
}

impl Demo {
    fn new(config: &Config) -> Self {
        Self {
            canvas: Canvas::with_background(0, 0, config.background),
            scene: Scene::new(),
            input: InputTracker::new(),
            quit_key: config.quit_key,
            dt: Duration::ZERO,
        }
    }

    fn pixel_bounds(&self) -> (i32, i32) {
        (
            i32::from(self.canvas.width()),
            i32::try_from(self.canvas.pixel_height()).unwrap_or(i32::MAX),
        )
    }
}

impl App for Demo {
    fn on_event(&mut self, event: &Event) -> Action {
        if let Event::Key(key) = event {
            let plain_q = key.code == KeyCode::Char('q') && key.modifiers.is_empty();
            if plain_q || key.is_ctrl(self.quit_key) {
                return Action::Quit;
            }
        }
        self.input.on_event(event);
        Action::Continue
    }

    fn on_tick(&mut self, dt: Duration) {
        self.dt = dt;
    }

    fn paint(&mut self, buf: &mut FrameBuffer) {
        if self.canvas.fit(buf) || self.scene.is_empty() {
            let (w, h) = self.pixel_bounds();
            self.scene = Scene::demo(w, h);
            log::debug!("scene rebuilt for {w}x{h} pixels, {} entities", self.scene.entities().len());
        }
        self.canvas.clear();

        let state = self.input.snapshot(self.dt, self.pixel_bounds());
        self.scene.update_all(&state);
        self.scene.draw_all(&mut self.canvas);
        self.canvas.composite(buf);
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Route logs to `path`. The terminal is busy with the UI, so without a log
/// file nothing is logged.
fn init_logging(path: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to initialize logger")?;
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::discover(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_overrides(cli.overrides())
        .context("invalid command-line option")?;

    init_logging(config.log_file.as_ref())?;
    log::info!(
        "starting halfblock at {} fps, background {}",
        config.frame_rate,
        config.background
    );

    let mut demo = Demo::new(&config);
    EventLoop::new(config.loop_config())
        .run(&mut demo)
        .context("terminal event loop failed")?;

    log::info!("exiting");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
