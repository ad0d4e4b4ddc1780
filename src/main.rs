mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use gallery_shooter::compute::{init_stage, tick};
use gallery_shooter::entities::{Controls, Stage};

#[derive(Parser)]
#[command(name = "gallery_shooter")]
#[command(about = "Five scripted waves of enemies, one ship, three lives")]
struct Args {
    /// Simulation frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Seed for enemy movement and spawn positions (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Write tracing output to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log: Option<PathBuf>,
}

// ── Held-key input ────────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this long.  Covers terminals that don't emit key-release events: the OS
/// key-repeat rate is ≥ 15 Hz, so the window is refreshed before it expires.
const HOLD_WINDOW: Duration = Duration::from_millis(133);

/// Tracks the frame on which every key was last pressed or repeated.
struct HeldKeys {
    last_seen: HashMap<KeyCode, u64>,
    window: u64,
}

impl HeldKeys {
    fn new(frame_time: Duration) -> Self {
        let window = (HOLD_WINDOW.as_millis() / frame_time.as_millis().max(1)) as u64;
        HeldKeys {
            last_seen: HashMap::new(),
            window: window.max(1),
        }
    }

    /// Returns true if `key` was seen within the hold window.
    fn is_held(&self, key: &KeyCode, frame: u64) -> bool {
        self.last_seen
            .get(key)
            .map(|&last| frame.saturating_sub(last) <= self.window)
            .unwrap_or(false)
    }

    fn any_held(&self, keys: &[KeyCode], frame: u64) -> bool {
        keys.iter().any(|key| self.is_held(key, frame))
    }

    /// Translate the keys currently held into this frame's controls.
    fn controls(&self, frame: u64) -> Controls {
        Controls {
            left: self.any_held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame),
            right: self.any_held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame),
            fire: self.is_held(&KeyCode::Char(' '), frame),
            restart: self.any_held(&[KeyCode::Char('r'), KeyCode::Char('R')], frame),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `HeldKeys` map that records the frame number of the last press/repeat
/// event for every key.  Each frame the keys that are still "fresh" become
/// the `Controls` handed to the simulation, so Space + A/D can be held at the
/// same time with no interference.
fn game_loop<W: Write>(
    out: &mut W,
    stage: &mut Stage,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
    frame_time: Duration,
) -> std::io::Result<()> {
    let mut held = HeldKeys::new(frame_time);
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    held.last_seen.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    held.last_seen.insert(code, frame);
                }
                KeyEventKind::Release => {
                    held.last_seen.remove(&code);
                }
            }
        }

        tick(stage, &held.controls(frame), rng);

        for cue in stage.drain_cues() {
            tracing::debug!(cue = cue.name(), "sound");
        }

        display::render(out, stage)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let mut stage = init_stage(0);
    stage
        .schedule
        .validate()
        .context("built-in wave schedule is inconsistent")?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame_time = Duration::from_secs(1) / args.fps;
    tracing::info!(fps = args.fps, seed = ?args.seed, "starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, &mut stage, &mut rng, &rx, frame_time);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    tracing::info!(highscore = stage.state.highscore, "exiting");
    result.context("game loop failed")
}
