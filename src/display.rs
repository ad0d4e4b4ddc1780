/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// stage.  No game logic is performed; this module only translates world
/// coordinates into terminal cells and state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use gallery_shooter::compute::{hud, Banner, CONTROLS_HINT};
use gallery_shooter::entities::{Entity, FormationKind, Stage, WORLD_HEIGHT, WORLD_WIDTH};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_WAVE: Color = Color::White;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_ENEMY_STATIC: Color = Color::Blue;
const C_ENEMY_MOVING: Color = Color::Green;
const C_ENEMY_SHOOTER: Color = Color::Red;
const C_BULLET: Color = Color::Cyan;
const C_ENEMY_SHOT: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Terminal area the play field is drawn into: rows 2 ..= height-3 and
/// columns 1 ..= width-2, inside the border.
struct Viewport {
    width: u16,
    height: u16,
}

impl Viewport {
    /// Cell for a world position, or `None` when it falls outside the field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(0.0..WORLD_WIDTH).contains(&x) || !(0.0..WORLD_HEIGHT).contains(&y) {
            return None;
        }
        let cols = self.width.saturating_sub(2) as f32;
        let rows = self.height.saturating_sub(4) as f32;
        let col = 1 + (x / WORLD_WIDTH * cols) as u16;
        let row = 2 + (y / WORLD_HEIGHT * rows) as u16;
        Some((col, row))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, stage: &Stage) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport { width, height };

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view)?;
    draw_hud(out, stage, &view)?;

    for formation in &stage.formations {
        let (glyph, color) = match formation.kind {
            FormationKind::Static => ("▼", C_ENEMY_STATIC),
            FormationKind::MovingLeft | FormationKind::MovingRight => ("◆", C_ENEMY_MOVING),
            FormationKind::Shooter => ("◎", C_ENEMY_SHOOTER),
        };
        for enemy in formation.members.iter().filter(|e| e.active) {
            draw_glyph(out, &view, enemy, glyph, color)?;
        }
    }
    for bullet in stage.bullets.active() {
        draw_glyph(out, &view, bullet, "║", C_BULLET)?;
    }
    for shot in stage.enemy_shots.active() {
        draw_glyph(out, &view, shot, "↓", C_ENEMY_SHOT)?;
    }

    draw_glyph(out, &view, &stage.player, "▲", C_PLAYER)?;
    draw_controls_hint(out, &view)?;

    if stage.state.is_over() {
        draw_banners(out, stage, &view)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, stage: &Stage, view: &Viewport) -> std::io::Result<()> {
    let hud = hud(stage);

    // Score and high score — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("{}  {}", hud.score, hud.high_score)))?;

    // Wave — centre
    let wx = (view.width / 2).saturating_sub(hud.wave.len() as u16 / 2);
    out.queue(cursor::MoveTo(wx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(&hud.wave))?;

    // Lives — right
    let lx = view.width.saturating_sub(hud.lives.len() as u16 + 1);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&hud.lives))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_glyph<W: Write>(
    out: &mut W,
    view: &Viewport,
    entity: &Entity,
    glyph: &str,
    color: Color,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(entity.x, entity.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(CONTROLS_HINT))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_banners<W: Write>(out: &mut W, stage: &Stage, view: &Viewport) -> std::io::Result<()> {
    let banners = hud(stage).banners;
    let cx = view.width / 2;
    let start_row = (view.height / 2).saturating_sub(banners.len() as u16);

    for (i, banner) in banners.iter().enumerate() {
        let color = match banner {
            Banner::GameOver | Banner::RestartPrompt => Color::White,
            Banner::Won | Banner::NewHighscore => Color::Yellow,
            Banner::Destroyed => Color::Red,
        };
        let text = banner.text();
        let row = start_row + 2 * i as u16;
        let col = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(text))?;
    }

    Ok(())
}
