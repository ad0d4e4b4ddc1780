/// All game entity types — pure data, no logic.

use crate::pool::Pool;
use crate::waves::WaveSchedule;

// ── World geometry ────────────────────────────────────────────────────────────

/// Logical play-field size.  The host scales this to whatever it draws on.
pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;

pub const PLAYER_SPAWN: (f32, f32) = (400.0, 575.0);
pub const STARTING_HEALTH: u32 = 3;

/// Where enemies wait while they are not part of the fight.
pub const ENEMY_PARK: (f32, f32) = (-120.0, -120.0);
/// Where retired bullets and enemy shots are kept.
pub const BULLET_PARK: (f32, f32) = (-300.0, -100.0);
pub const SHOT_PARK: (f32, f32) = (-100.0, 700.0);

pub const BULLET_CAPACITY: usize = 3;
pub const ENEMY_SHOT_CAPACITY: usize = 10;

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormationKind {
    /// Drops straight down.
    Static,
    /// Zig-zags, entering from the left edge.
    MovingLeft,
    /// Mirror image of `MovingLeft`, entering from the right edge.
    MovingRight,
    /// Wobbles sideways and fires down at the player.
    Shooter,
}

impl FormationKind {
    pub const ALL: [FormationKind; 4] = [
        FormationKind::Static,
        FormationKind::MovingLeft,
        FormationKind::MovingRight,
        FormationKind::Shooter,
    ];

    /// Number of pre-allocated enemies in this formation.
    pub fn size(self) -> usize {
        match self {
            FormationKind::Static => 20,
            FormationKind::MovingLeft => 20,
            FormationKind::MovingRight => 20,
            FormationKind::Shooter => 10,
        }
    }

    /// Score awarded when a bullet destroys one of these enemies.
    pub fn points(self) -> u32 {
        match self {
            FormationKind::Static => 10,
            FormationKind::MovingLeft | FormationKind::MovingRight => 20,
            FormationKind::Shooter => 30,
        }
    }

    /// Position inside `Stage::formations`.
    pub fn index(self) -> usize {
        match self {
            FormationKind::Static => 0,
            FormationKind::MovingLeft => 1,
            FormationKind::MovingRight => 2,
            FormationKind::Shooter => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Enemy(FormationKind),
    Bullet,
    EnemyShot,
}

impl EntityKind {
    /// On-screen footprint as (width, height), used for collision.
    pub fn display_size(self) -> (f32, f32) {
        match self {
            EntityKind::Player => (48.0, 48.0),
            EntityKind::Enemy(_) => (40.0, 40.0),
            EntityKind::Bullet => (16.0, 24.0),
            EntityKind::EnemyShot => (20.0, 20.0),
        }
    }
}

// ── Entity ────────────────────────────────────────────────────────────────────

/// One pre-allocated sprite slot.  Never destroyed, only parked and revived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    /// Centre of the sprite.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Visible and taking part in motion and collision.
    pub active: bool,
    pub kind: EntityKind,
}

impl Entity {
    /// An inactive entity of `kind` sitting at `(x, y)`.
    pub fn new(kind: EntityKind, x: f32, y: f32) -> Self {
        let (width, height) = kind.display_size();
        Entity {
            x,
            y,
            width,
            height,
            active: false,
            kind,
        }
    }

    pub fn place(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.active = true;
    }

    pub fn park(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.active = false;
    }
}

// ── Formations ────────────────────────────────────────────────────────────────

/// A fixed-size group of enemies addressed by index from the wave schedule.
#[derive(Clone, Debug)]
pub struct Formation {
    pub kind: FormationKind,
    pub members: Vec<Entity>,
}

impl Formation {
    pub fn new(kind: FormationKind) -> Self {
        let (x, y) = ENEMY_PARK;
        Formation {
            kind,
            members: vec![Entity::new(EntityKind::Enemy(kind), x, y); kind.size()],
        }
    }

    /// Park every member off-screen.
    pub fn reset(&mut self) {
        let (x, y) = ENEMY_PARK;
        for enemy in &mut self.members {
            enemy.park(x, y);
        }
    }

    pub fn active_count(&self) -> usize {
        self.members.iter().filter(|e| e.active).count()
    }
}

// ── Game state ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// How a finished round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Destroyed,
}

/// Score, health, wave progress and the frame-counted timers.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub health: u32,
    pub score: u32,
    /// Best score of this session.  Survives restarts.
    pub highscore: u32,
    pub wave: u32,
    /// Frames elapsed in the current wave.
    pub wave_timer: u32,
    pub status: GameStatus,
    /// Raised while the game-over screen shows a freshly beaten high score.
    pub new_highscore: bool,
    /// The player may fire once this drops below zero.
    pub bullet_cooldown: i32,
    /// Shared by every shooter; a shot may be fired once this drops below zero.
    pub enemy_shot_cooldown: i32,
}

impl GameState {
    pub fn new(highscore: u32) -> Self {
        GameState {
            health: STARTING_HEALTH,
            score: 0,
            highscore,
            wave: 1,
            wave_timer: 0,
            status: GameStatus::Playing,
            new_highscore: false,
            bullet_cooldown: 0,
            enemy_shot_cooldown: 0,
        }
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// `None` while playing.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            GameStatus::Playing => None,
            GameStatus::GameOver if self.health == 0 => Some(Outcome::Destroyed),
            GameStatus::GameOver => Some(Outcome::Won),
        }
    }
}

// ── Input & output ────────────────────────────────────────────────────────────

/// Held-key state for one frame, as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub restart: bool,
}

/// Fire-and-forget sound request produced by a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Shoot,
    HitPlayer,
    HitEnemy,
    EnemyShoot,
    NextWave,
    Win,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Shoot => "shoot",
            Cue::HitPlayer => "hit-player",
            Cue::HitEnemy => "hit-enemy",
            Cue::EnemyShoot => "enemy-shoot",
            Cue::NextWave => "next-wave",
            Cue::Win => "win",
        }
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything one session mutates.  Built once by `compute::init_stage`;
/// restarting recycles it in place.
#[derive(Clone, Debug)]
pub struct Stage {
    pub player: Entity,
    /// Indexed by `FormationKind::index`.
    pub formations: [Formation; 4],
    pub bullets: Pool,
    pub enemy_shots: Pool,
    pub state: GameState,
    pub schedule: WaveSchedule,
    /// Sound cues raised since the host last drained them.
    pub cues: Vec<Cue>,
}

impl Stage {
    pub fn formation(&self, kind: FormationKind) -> &Formation {
        &self.formations[kind.index()]
    }

    pub fn formation_mut(&mut self, kind: FormationKind) -> &mut Formation {
        &mut self.formations[kind.index()]
    }

    pub fn active_enemies(&self) -> usize {
        self.formations.iter().map(Formation::active_count).sum()
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}
