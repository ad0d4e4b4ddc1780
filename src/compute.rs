/// Game-logic functions.
///
/// Everything here mutates a `Stage` in place: the pools and formations are
/// allocated once by `init_stage` and recycled for the rest of the session.
/// Side effects are limited to the stage itself and the injected RNG.

use rand::Rng;

use crate::entities::{
    Controls, Cue, Entity, EntityKind, Formation, FormationKind, GameState, GameStatus, Outcome,
    Stage, BULLET_CAPACITY, BULLET_PARK, ENEMY_SHOT_CAPACITY, PLAYER_SPAWN, SHOT_PARK,
};
use crate::pool::Pool;
use crate::waves::{self, WaveSchedule};

// ── Tuning ────────────────────────────────────────────────────────────────────

const PLAYER_STEP: f32 = 12.0;
const PLAYER_MIN_X: f32 = 35.0;
const PLAYER_MAX_X: f32 = 765.0;

/// Frames between player shots.
const BULLET_COOLDOWN: i32 = 5;
const BULLET_SPAWN_OFFSET: f32 = 25.0;
const BULLET_VELOCITY: f32 = -20.0;
/// Bullets above this line are retired.
const BULLET_RETIRE_Y: f32 = -30.0;

const SHOT_VELOCITY: f32 = 10.0;
const SHOT_SPAWN_OFFSET: f32 = 20.0;
/// Enemy shots below this line are retired.
const SHOT_RETIRE_Y: f32 = 630.0;
/// Shooter cooldown resets to `SHOT_COOLDOWN_BASE + [0, SHOT_COOLDOWN_SPREAD)`.
const SHOT_COOLDOWN_BASE: i32 = 10;
const SHOT_COOLDOWN_SPREAD: i32 = 50;
/// Each shooter tries to fire with probability 1 / SHOT_CHANCE per frame.
const SHOT_CHANCE: u32 = 5;

const STATIC_SPEED: f32 = 2.0;
const MOVING_SPEED: f32 = 3.0;
const MOVING_DRIFT: f32 = 3.0;
const SHOOTER_SPEED: f32 = 1.75;
const SHOOTER_WOBBLE: f32 = 6.0;

/// Enemies below this line leave the fight.
const ENEMY_RETIRE_Y: f32 = 650.0;
/// Where an enemy goes after ramming the player / being shot.
const RAMMED_ENEMY_Y: f32 = -100.0;
const SHOT_DOWN_ENEMY_Y: f32 = 700.0;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Allocate every entity the session will ever use, all parked, and start a
/// round carrying over `highscore`.
pub fn init_stage(highscore: u32) -> Stage {
    let (px, py) = PLAYER_SPAWN;
    let mut player = Entity::new(EntityKind::Player, px, py);
    player.active = true;

    Stage {
        player,
        formations: FormationKind::ALL.map(Formation::new),
        bullets: Pool::new(EntityKind::Bullet, BULLET_CAPACITY, BULLET_PARK),
        enemy_shots: Pool::new(EntityKind::EnemyShot, ENEMY_SHOT_CAPACITY, SHOT_PARK),
        state: GameState::new(highscore),
        schedule: WaveSchedule::default(),
        cues: Vec::new(),
    }
}

/// Put the stage back to the start of wave 1 without reallocating anything.
/// Only the high score survives.
pub fn restart(stage: &mut Stage) {
    stage.state = GameState::new(stage.state.highscore);

    let (px, py) = PLAYER_SPAWN;
    stage.player.place(px, py);

    for formation in &mut stage.formations {
        formation.reset();
    }
    stage.bullets.release_all();
    stage.enemy_shots.release_all();

    tracing::info!(highscore = stage.state.highscore, "restarted");
}

// ── Input-driven state transitions ───────────────────────────────────────────

pub fn move_player_left(stage: &mut Stage) {
    if stage.player.x > PLAYER_MIN_X {
        stage.player.x -= PLAYER_STEP;
    }
}

pub fn move_player_right(stage: &mut Stage) {
    if stage.player.x < PLAYER_MAX_X {
        stage.player.x += PLAYER_STEP;
    }
}

/// Fire a bullet from the player if the cooldown has run out and a bullet
/// slot is free.  Returns whether a bullet left the ship.
pub fn player_shoot(stage: &mut Stage) -> bool {
    if stage.state.bullet_cooldown >= 0 {
        return false;
    }
    let (x, y) = (stage.player.x, stage.player.y - BULLET_SPAWN_OFFSET);
    let Some(bullet) = stage.bullets.acquire() else {
        return false;
    };
    bullet.place(x, y);
    stage.state.bullet_cooldown = BULLET_COOLDOWN;
    stage.cues.push(Cue::Shoot);
    true
}

// ── Collision ────────────────────────────────────────────────────────────────

/// Axis-aligned overlap of the two display boxes.  Touching edges count.
pub fn collides(a: &Entity, b: &Entity) -> bool {
    (a.x - b.x).abs() <= a.width / 2.0 + b.width / 2.0
        && (a.y - b.y).abs() <= a.height / 2.0 + b.height / 2.0
}

// ── Ledger ───────────────────────────────────────────────────────────────────

fn damage_player(state: &mut GameState, cues: &mut Vec<Cue>) {
    cues.push(Cue::HitPlayer);
    state.health = state.health.saturating_sub(1);
    if state.health == 0 && state.status == GameStatus::Playing {
        state.status = GameStatus::GameOver;
        tracing::info!(score = state.score, wave = state.wave, "player destroyed");
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
pub fn tick(stage: &mut Stage, controls: &Controls, rng: &mut impl Rng) {
    match stage.state.status {
        GameStatus::Playing => tick_playing(stage, controls, rng),
        GameStatus::GameOver => tick_game_over(stage, controls),
    }
}

fn tick_playing(stage: &mut Stage, controls: &Controls, rng: &mut impl Rng) {
    // ── 1. Clock ─────────────────────────────────────────────────────────────
    let state = &mut stage.state;
    state.bullet_cooldown -= 1;
    state.enemy_shot_cooldown -= 1;
    state.wave_timer += 1;

    // ── 2. Fire ──────────────────────────────────────────────────────────────
    if controls.fire {
        player_shoot(stage);
    }

    // ── 3. Bullets ───────────────────────────────────────────────────────────
    update_bullets(stage);

    // ── 4. Wave script ───────────────────────────────────────────────────────
    waves::direct(stage, rng);

    // ── 5. Enemies ───────────────────────────────────────────────────────────
    move_formations(stage, rng);

    // ── 6. Enemy shots ───────────────────────────────────────────────────────
    update_enemy_shots(stage);

    // ── 7. Player ────────────────────────────────────────────────────────────
    if controls.left {
        move_player_left(stage);
    }
    if controls.right {
        move_player_right(stage);
    }
}

fn tick_game_over(stage: &mut Stage, controls: &Controls) {
    let state = &mut stage.state;
    if state.score > state.highscore {
        state.highscore = state.score;
        state.new_highscore = true;
        tracing::info!(highscore = state.highscore, "new high score");
    }
    if controls.restart {
        restart(stage);
    }
}

/// Retire stray bullets, resolve bullet hits, then move the survivors up.
fn update_bullets(stage: &mut Stage) {
    for i in 0..stage.bullets.capacity() {
        let Some(bullet) = stage.bullets.get(i).copied().filter(|b| b.active) else {
            continue;
        };
        if bullet.y < BULLET_RETIRE_Y {
            stage.bullets.release(i);
            continue;
        }
        if let Some(kind) = shoot_down(&mut stage.formations, &bullet) {
            stage.bullets.release(i);
            stage.state.score += kind.points();
            stage.cues.push(Cue::HitEnemy);
        }
    }
    for bullet in stage.bullets.active_mut() {
        bullet.y += BULLET_VELOCITY;
    }
}

/// Remove the first active enemy `bullet` touches, in formation order.
fn shoot_down(formations: &mut [Formation], bullet: &Entity) -> Option<FormationKind> {
    for formation in formations.iter_mut() {
        let hit = formation
            .members
            .iter_mut()
            .find(|enemy| enemy.active && collides(enemy, bullet));
        if let Some(enemy) = hit {
            enemy.park(enemy.x, SHOT_DOWN_ENEMY_Y);
            return Some(formation.kind);
        }
    }
    None
}

/// Zig-zag step shared by both moving formations.  `dir` is +1 for the
/// left-hand stream and -1 for its mirror.
fn drift(enemy: &mut Entity, dir: f32) {
    enemy.y += MOVING_SPEED;
    let sign = if enemy.y < 250.0 {
        dir
    } else if enemy.y < 400.0 {
        -dir
    } else if enemy.y > ENEMY_RETIRE_Y {
        0.0
    } else {
        dir
    };
    enemy.x += sign * MOVING_DRIFT;
}

/// Move every active enemy, let shooters fire, and resolve rams.
fn move_formations(stage: &mut Stage, rng: &mut impl Rng) {
    let player = stage.player;
    let state = &mut stage.state;
    let cues = &mut stage.cues;

    for formation in stage.formations.iter_mut() {
        let kind = formation.kind;
        for enemy in formation.members.iter_mut().filter(|e| e.active) {
            match kind {
                FormationKind::Static => enemy.y += STATIC_SPEED,
                FormationKind::MovingLeft => drift(enemy, 1.0),
                FormationKind::MovingRight => drift(enemy, -1.0),
                FormationKind::Shooter => {
                    enemy.y += SHOOTER_SPEED;
                    enemy.x += if rng.gen_bool(0.5) {
                        SHOOTER_WOBBLE
                    } else {
                        -SHOOTER_WOBBLE
                    };
                    if rng.gen_ratio(1, SHOT_CHANCE) && state.enemy_shot_cooldown < 0 {
                        // No free slot means no shot, no sound and no cooldown reset.
                        if let Some(shot) = stage.enemy_shots.acquire() {
                            shot.place(enemy.x, enemy.y + SHOT_SPAWN_OFFSET);
                            state.enemy_shot_cooldown =
                                SHOT_COOLDOWN_BASE + rng.gen_range(0..SHOT_COOLDOWN_SPREAD);
                            cues.push(Cue::EnemyShoot);
                        }
                    }
                }
            }

            if enemy.y > ENEMY_RETIRE_Y {
                enemy.active = false;
                continue;
            }
            if collides(enemy, &player) {
                enemy.park(enemy.x, RAMMED_ENEMY_Y);
                damage_player(state, cues);
            }
        }
    }
}

/// Retire stray shots, resolve hits on the player, then move the rest down.
fn update_enemy_shots(stage: &mut Stage) {
    let player = stage.player;
    for i in 0..stage.enemy_shots.capacity() {
        let Some(shot) = stage.enemy_shots.get(i).copied().filter(|s| s.active) else {
            continue;
        };
        if shot.y > SHOT_RETIRE_Y {
            stage.enemy_shots.release(i);
            continue;
        }
        if collides(&player, &shot) {
            stage.enemy_shots.release(i);
            damage_player(&mut stage.state, &mut stage.cues);
        }
    }
    for shot in stage.enemy_shots.active_mut() {
        shot.y += SHOT_VELOCITY;
    }
}

// ── HUD ──────────────────────────────────────────────────────────────────────

/// Key legend shown on the bottom row at all times.
pub const CONTROLS_HINT: &str = "← → / A D : Move   SPACE : Shoot   R : Restart   Q : Quit";

/// Text overlays shown once the round is over, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Banner {
    GameOver,
    Won,
    Destroyed,
    NewHighscore,
    RestartPrompt,
}

impl Banner {
    pub fn text(self) -> &'static str {
        match self {
            Banner::GameOver => "GAME OVER",
            Banner::Won => "You won!",
            Banner::Destroyed => "You are destroyed",
            Banner::NewHighscore => "NEW HIGHSCORE",
            Banner::RestartPrompt => "press \"R\" to restart the game",
        }
    }
}

/// Every string the text display shows for the current frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    pub score: String,
    pub high_score: String,
    pub wave: String,
    pub lives: String,
    pub banners: Vec<Banner>,
}

pub fn hud(stage: &Stage) -> Hud {
    let state = &stage.state;
    let mut banners = Vec::new();
    if let Some(outcome) = state.outcome() {
        banners.push(Banner::GameOver);
        banners.push(match outcome {
            Outcome::Won => Banner::Won,
            Outcome::Destroyed => Banner::Destroyed,
        });
        if state.new_highscore {
            banners.push(Banner::NewHighscore);
        }
        banners.push(Banner::RestartPrompt);
    }

    Hud {
        score: format!("Score: {}", state.score),
        high_score: format!("High Score: {}", state.highscore),
        wave: format!("Wave {}", state.wave),
        lives: format!("Lives: {}", state.health),
        banners,
    }
}
