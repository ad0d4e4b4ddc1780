/// Wave director — the scripted spawn schedule and its evaluation.
///
/// Each wave is a list of triggers keyed on the exact frame of the wave
/// timer, followed by a finish rule.  Triggers match on equality, so each
/// one fires exactly once per run through the wave.  The last wave finishes
/// on a threshold instead and ends the round as a win.

use std::ops::Range;

use rand::Rng;
use thiserror::Error;

use crate::entities::{Cue, Formation, FormationKind, GameStatus, Stage};

pub const WIN_BONUS: u32 = 1000;

// ── Schedule data ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Bring a slice of one formation onto the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnAction {
    /// A row-wrapped block of `Static` enemies sharing one random x offset.
    Static { begin: usize, end: usize },
    /// A diagonal stream of zig-zagging enemies from one side.
    Moving { side: Side, begin: usize, end: usize },
    /// `Shooter` enemies at random x positions.
    Shooting { begin: usize, end: usize },
}

impl SpawnAction {
    pub fn formation(&self) -> FormationKind {
        match self {
            SpawnAction::Static { .. } => FormationKind::Static,
            SpawnAction::Moving { side: Side::Left, .. } => FormationKind::MovingLeft,
            SpawnAction::Moving { side: Side::Right, .. } => FormationKind::MovingRight,
            SpawnAction::Shooting { .. } => FormationKind::Shooter,
        }
    }

    pub fn range(&self) -> Range<usize> {
        match *self {
            SpawnAction::Static { begin, end }
            | SpawnAction::Moving { begin, end, .. }
            | SpawnAction::Shooting { begin, end } => begin..end,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trigger {
    /// Wave-timer value on which the batch spawns.
    pub at: u32,
    pub spawns: Vec<SpawnAction>,
}

/// How a wave ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finish {
    /// Move on to the next wave when the timer equals `at`.
    Advance { at: u32 },
    /// End the round as a win once the timer exceeds `after`.
    Win { after: u32, bonus: u32 },
}

impl Finish {
    /// First timer value on which this rule applies.
    pub fn frame(&self) -> u32 {
        match *self {
            Finish::Advance { at } => at,
            Finish::Win { after, .. } => after + 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaveScript {
    pub triggers: Vec<Trigger>,
    pub finish: Finish,
}

/// What the director wants done on one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Directive<'a> {
    Idle,
    Spawn(&'a [SpawnAction]),
    Advance,
    Win { bonus: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule has no waves")]
    Empty,
    #[error("wave {wave}: trigger at frame {at} does not come after frame {previous}")]
    Unordered { wave: u32, at: u32, previous: u32 },
    #[error("wave {wave}: trigger at frame {at} is not before the wave finishes at frame {finish}")]
    AfterFinish { wave: u32, at: u32, finish: u32 },
    #[error("wave {wave}: {formation:?} range {begin}..{end} does not fit a formation of {size}")]
    OutOfRange {
        wave: u32,
        formation: FormationKind,
        begin: usize,
        end: usize,
        size: usize,
    },
}

/// The ordered list of wave scripts.  Wave numbers start at 1.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveSchedule {
    pub waves: Vec<WaveScript>,
}

// ── The built-in five waves ───────────────────────────────────────────────────

fn stat(begin: usize, end: usize) -> SpawnAction {
    SpawnAction::Static { begin, end }
}

fn left(begin: usize, end: usize) -> SpawnAction {
    SpawnAction::Moving { side: Side::Left, begin, end }
}

fn right(begin: usize, end: usize) -> SpawnAction {
    SpawnAction::Moving { side: Side::Right, begin, end }
}

fn shoot(begin: usize, end: usize) -> SpawnAction {
    SpawnAction::Shooting { begin, end }
}

fn at(frame: u32, spawns: &[SpawnAction]) -> Trigger {
    Trigger {
        at: frame,
        spawns: spawns.to_vec(),
    }
}

impl Default for WaveSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl WaveSchedule {
    /// The fixed five-wave encounter.
    pub fn standard() -> Self {
        let waves = vec![
            WaveScript {
                triggers: vec![
                    at(25, &[stat(0, 5)]),
                    at(75, &[stat(5, 10)]),
                    at(150, &[stat(10, 15)]),
                    at(275, &[stat(15, 20)]),
                    at(400, &[stat(0, 5)]),
                ],
                finish: Finish::Advance { at: 600 },
            },
            WaveScript {
                triggers: vec![
                    at(25, &[left(0, 4), right(0, 4)]),
                    at(75, &[stat(5, 10)]),
                    at(100, &[stat(10, 15)]),
                    at(125, &[stat(15, 20)]),
                    at(225, &[left(8, 12), right(4, 8)]),
                ],
                finish: Finish::Advance { at: 425 },
            },
            WaveScript {
                triggers: vec![at(25, &[shoot(0, 5)])],
                finish: Finish::Advance { at: 325 },
            },
            WaveScript {
                triggers: vec![
                    at(25, &[shoot(5, 10), stat(0, 5)]),
                    at(125, &[left(0, 4), right(0, 4)]),
                    at(200, &[left(4, 8), right(4, 8)]),
                    at(300, &[stat(5, 10), stat(10, 15)]),
                ],
                finish: Finish::Advance { at: 500 },
            },
            WaveScript {
                triggers: vec![
                    at(25, &[shoot(0, 5), stat(15, 20), left(0, 4), right(0, 4)]),
                    at(225, &[shoot(5, 10), stat(0, 5), left(4, 8), right(4, 8)]),
                    at(425, &[stat(5, 10), left(8, 12), right(8, 12)]),
                ],
                finish: Finish::Win {
                    after: 800,
                    bonus: WIN_BONUS,
                },
            },
        ];
        WaveSchedule { waves }
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn wave(&self, wave: u32) -> Option<&WaveScript> {
        let index = usize::try_from(wave).ok()?.checked_sub(1)?;
        self.waves.get(index)
    }

    /// Check ordering and formation bounds of every wave.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.waves.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for (number, script) in (1u32..).zip(&self.waves) {
            let finish = script.finish.frame();
            let mut previous: Option<u32> = None;
            for trigger in &script.triggers {
                if let Some(previous) = previous {
                    if trigger.at <= previous {
                        return Err(ScheduleError::Unordered {
                            wave: number,
                            at: trigger.at,
                            previous,
                        });
                    }
                }
                if trigger.at >= finish {
                    return Err(ScheduleError::AfterFinish {
                        wave: number,
                        at: trigger.at,
                        finish,
                    });
                }
                for action in &trigger.spawns {
                    let formation = action.formation();
                    let Range { start, end } = action.range();
                    if start > end || end > formation.size() {
                        return Err(ScheduleError::OutOfRange {
                            wave: number,
                            formation,
                            begin: start,
                            end,
                            size: formation.size(),
                        });
                    }
                }
                previous = Some(trigger.at);
            }
        }
        Ok(())
    }

    /// Decide what happens on `wave_timer` of `wave`.  A matching trigger
    /// wins over the finish rule.
    pub fn directive(&self, wave: u32, wave_timer: u32) -> Directive<'_> {
        let Some(script) = self.wave(wave) else {
            return Directive::Idle;
        };
        if let Some(trigger) = script.triggers.iter().find(|t| t.at == wave_timer) {
            return Directive::Spawn(&trigger.spawns);
        }
        match script.finish {
            Finish::Advance { at } if wave_timer == at => Directive::Advance,
            Finish::Win { after, bonus } if wave_timer > after => Directive::Win { bonus },
            _ => Directive::Idle,
        }
    }
}

// ── Evaluation ────────────────────────────────────────────────────────────────

/// Apply this frame's directive to the stage.
pub fn direct(stage: &mut Stage, rng: &mut impl Rng) {
    let state = &mut stage.state;
    match stage.schedule.directive(state.wave, state.wave_timer) {
        Directive::Idle => {}
        Directive::Spawn(actions) => {
            for action in actions {
                tracing::debug!(
                    wave = state.wave,
                    frame = state.wave_timer,
                    ?action,
                    "spawning"
                );
                spawn(&mut stage.formations[action.formation().index()], action, rng);
            }
        }
        Directive::Advance => {
            state.wave += 1;
            state.wave_timer = 0;
            stage.cues.push(Cue::NextWave);
            tracing::debug!(wave = state.wave, "next wave");
        }
        Directive::Win { bonus } => {
            state.score += bonus;
            state.status = GameStatus::GameOver;
            stage.cues.push(Cue::Win);
            tracing::info!(score = state.score, "all waves cleared");
        }
    }
}

/// Position and activate the members of `formation` named by `action`.
pub fn spawn(formation: &mut Formation, action: &SpawnAction, rng: &mut impl Rng) {
    let range = action.range();
    let members = formation
        .members
        .iter_mut()
        .enumerate()
        .skip(range.start)
        .take(range.len());

    match *action {
        SpawnAction::Static { .. } => {
            let offset = rng.gen_range(0..400) as f32;
            for (i, enemy) in members {
                enemy.place((i % 5 * 100) as f32 + offset, -100.0);
            }
        }
        SpawnAction::Moving { side: Side::Left, .. } => {
            for (i, enemy) in members {
                let step = (i % 4 * 60) as f32;
                enemy.place(60.0 - step, -step - 60.0);
            }
        }
        SpawnAction::Moving { side: Side::Right, .. } => {
            for (i, enemy) in members {
                let step = (i % 4 * 60) as f32;
                enemy.place(step + 700.0, -step - 50.0);
            }
        }
        SpawnAction::Shooting { .. } => {
            for (i, enemy) in members {
                let x = rng.gen_range(0..500) as f32 + 50.0;
                enemy.place(x, -((i % 5 * 120) as f32) - 50.0);
            }
        }
    }
}
