use gallery_shooter::compute::init_stage;
use gallery_shooter::entities::*;
use gallery_shooter::waves::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn positions(f: &Formation, begin: usize, end: usize) -> Vec<(f32, f32)> {
    f.members[begin..end].iter().map(|e| (e.x, e.y)).collect()
}

// ── validation ────────────────────────────────────────────────────────────────

#[test]
fn standard_schedule_is_valid() {
    let s = WaveSchedule::standard();
    assert_eq!(s.len(), 5);
    assert_eq!(s.validate(), Ok(()));
}

#[test]
fn empty_schedule_is_rejected() {
    let s = WaveSchedule { waves: Vec::new() };
    assert!(s.is_empty());
    assert_eq!(s.validate(), Err(ScheduleError::Empty));
    assert_eq!(ScheduleError::Empty.to_string(), "schedule has no waves");
}

#[test]
fn unordered_triggers_are_rejected() {
    let mut s = WaveSchedule::standard();
    s.waves[0].triggers.swap(1, 2); // 150 before 75
    assert_eq!(
        s.validate(),
        Err(ScheduleError::Unordered { wave: 1, at: 75, previous: 150 })
    );
}

#[test]
fn duplicate_trigger_frame_is_rejected() {
    let mut s = WaveSchedule::standard();
    s.waves[2].triggers.push(Trigger { at: 25, spawns: Vec::new() });
    assert_eq!(
        s.validate(),
        Err(ScheduleError::Unordered { wave: 3, at: 25, previous: 25 })
    );
}

#[test]
fn trigger_at_or_after_finish_is_rejected() {
    let mut s = WaveSchedule::standard();
    s.waves[0].triggers.push(Trigger { at: 600, spawns: Vec::new() });
    assert_eq!(
        s.validate(),
        Err(ScheduleError::AfterFinish { wave: 1, at: 600, finish: 600 })
    );

    let mut s = WaveSchedule::standard();
    s.waves[4].triggers.push(Trigger { at: 801, spawns: Vec::new() });
    assert_eq!(
        s.validate(),
        Err(ScheduleError::AfterFinish { wave: 5, at: 801, finish: 801 })
    );
}

#[test]
fn oversized_spawn_range_is_rejected() {
    let mut s = WaveSchedule::standard();
    s.waves[2].triggers[0].spawns = vec![SpawnAction::Shooting { begin: 8, end: 11 }];
    assert_eq!(
        s.validate(),
        Err(ScheduleError::OutOfRange {
            wave: 3,
            formation: FormationKind::Shooter,
            begin: 8,
            end: 11,
            size: 10,
        })
    );
}

// ── directive ─────────────────────────────────────────────────────────────────

#[test]
fn wave_lookup_is_one_based() {
    let s = WaveSchedule::standard();
    assert!(s.wave(0).is_none());
    assert!(s.wave(1).is_some());
    assert!(s.wave(5).is_some());
    assert!(s.wave(6).is_none());
    assert_eq!(s.directive(6, 25), Directive::Idle);
}

#[test]
fn wave_one_triggers_on_exact_frames() {
    let s = WaveSchedule::standard();
    assert_eq!(s.directive(1, 24), Directive::Idle);
    assert_eq!(
        s.directive(1, 25),
        Directive::Spawn(&[SpawnAction::Static { begin: 0, end: 5 }])
    );
    assert_eq!(s.directive(1, 26), Directive::Idle);
    assert_eq!(s.directive(1, 599), Directive::Idle);
    assert_eq!(s.directive(1, 600), Directive::Advance);
    assert_eq!(s.directive(1, 601), Directive::Idle);
}

#[test]
fn each_trigger_fires_once_per_pass() {
    let s = WaveSchedule::standard();
    for wave in 1..=4u32 {
        let script = s.wave(wave).unwrap();
        let frames: Vec<u32> = (0..=script.finish.frame())
            .filter(|&t| matches!(s.directive(wave, t), Directive::Spawn(_)))
            .collect();
        let expected: Vec<u32> = script.triggers.iter().map(|t| t.at).collect();
        assert_eq!(frames, expected, "wave {wave}");

        let advances = (0..=2000)
            .filter(|&t| s.directive(wave, t) == Directive::Advance)
            .count();
        assert_eq!(advances, 1, "wave {wave}");
    }
}

#[test]
fn wave_five_spawns_stop_before_the_win() {
    let s = WaveSchedule::standard();
    let script = s.wave(5).unwrap();
    let finish = script.finish.frame();
    assert_eq!(finish, 801);

    let frames: Vec<u32> = (0..=finish)
        .filter(|&t| matches!(s.directive(5, t), Directive::Spawn(_)))
        .collect();
    let expected: Vec<u32> = script.triggers.iter().map(|t| t.at).collect();
    assert_eq!(frames, expected);

    let first_win = (0..=2000).find(|&t| matches!(s.directive(5, t), Directive::Win { .. }));
    assert_eq!(first_win, Some(801));
    assert!((801..=2000).all(|t| !matches!(s.directive(5, t), Directive::Spawn(_))));
}

#[test]
fn finish_frames_per_wave() {
    let s = WaveSchedule::standard();
    let finishes: Vec<Finish> = s.waves.iter().map(|w| w.finish).collect();
    assert_eq!(
        finishes,
        vec![
            Finish::Advance { at: 600 },
            Finish::Advance { at: 425 },
            Finish::Advance { at: 325 },
            Finish::Advance { at: 500 },
            Finish::Win { after: 800, bonus: 1000 },
        ]
    );
}

#[test]
fn wave_five_wins_on_threshold_not_equality() {
    let s = WaveSchedule::standard();
    assert_eq!(s.directive(5, 800), Directive::Idle);
    assert_eq!(s.directive(5, 801), Directive::Win { bonus: WIN_BONUS });
    assert_eq!(s.directive(5, 5000), Directive::Win { bonus: WIN_BONUS });
}

#[test]
fn wave_five_batches_mix_formations() {
    let s = WaveSchedule::standard();
    let Directive::Spawn(actions) = s.directive(5, 25) else {
        panic!("expected a spawn at frame 25");
    };
    let kinds: Vec<FormationKind> = actions.iter().map(SpawnAction::formation).collect();
    assert_eq!(
        kinds,
        vec![
            FormationKind::Shooter,
            FormationKind::Static,
            FormationKind::MovingLeft,
            FormationKind::MovingRight,
        ]
    );
}

// ── spawn ─────────────────────────────────────────────────────────────────────

#[test]
fn spawn_static_rows_share_one_offset() {
    let mut f = Formation::new(FormationKind::Static);
    spawn(&mut f, &SpawnAction::Static { begin: 0, end: 5 }, &mut seeded_rng());

    assert_eq!(f.active_count(), 5);
    assert!(f.members[..5].iter().all(|e| e.active && e.y == -100.0));
    assert!(f.members[5..].iter().all(|e| !e.active));

    let offset = f.members[0].x;
    assert!((0.0..400.0).contains(&offset));
    for (i, e) in f.members[..5].iter().enumerate() {
        assert_eq!(e.x, (i % 5 * 100) as f32 + offset);
    }
}

#[test]
fn spawn_static_wraps_every_five() {
    let mut f = Formation::new(FormationKind::Static);
    spawn(&mut f, &SpawnAction::Static { begin: 5, end: 10 }, &mut seeded_rng());
    let offset = f.members[5].x;
    assert!((0.0..400.0).contains(&offset));
    assert_eq!(f.members[9].x, offset + 400.0);
    assert!(!f.members[0].active);
}

#[test]
fn spawn_moving_left_stream() {
    let mut f = Formation::new(FormationKind::MovingLeft);
    let action = SpawnAction::Moving { side: Side::Left, begin: 0, end: 4 };
    spawn(&mut f, &action, &mut seeded_rng());
    assert_eq!(
        positions(&f, 0, 4),
        vec![(60.0, -60.0), (0.0, -120.0), (-60.0, -180.0), (-120.0, -240.0)]
    );
    assert_eq!(f.active_count(), 4);
}

#[test]
fn spawn_moving_right_stream() {
    let mut f = Formation::new(FormationKind::MovingRight);
    let action = SpawnAction::Moving { side: Side::Right, begin: 4, end: 8 };
    spawn(&mut f, &action, &mut seeded_rng());
    assert_eq!(
        positions(&f, 4, 8),
        vec![(700.0, -50.0), (760.0, -110.0), (820.0, -170.0), (880.0, -230.0)]
    );
    assert_eq!(f.active_count(), 4);
}

#[test]
fn spawn_shooters_at_random_columns() {
    let mut f = Formation::new(FormationKind::Shooter);
    spawn(&mut f, &SpawnAction::Shooting { begin: 0, end: 5 }, &mut seeded_rng());
    let ys: Vec<f32> = f.members[..5].iter().map(|e| e.y).collect();
    assert_eq!(ys, vec![-50.0, -170.0, -290.0, -410.0, -530.0]);
    assert!(f.members[..5].iter().all(|e| (50.0..550.0).contains(&e.x)));
}

#[test]
fn spawn_action_maps_to_formation() {
    assert_eq!(
        SpawnAction::Moving { side: Side::Right, begin: 0, end: 1 }.formation(),
        FormationKind::MovingRight
    );
    assert_eq!(SpawnAction::Static { begin: 2, end: 7 }.range(), 2..7);
}

// ── direct ────────────────────────────────────────────────────────────────────

#[test]
fn direct_advances_wave() {
    let mut stage = init_stage(0);
    stage.state.wave_timer = 600;
    direct(&mut stage, &mut seeded_rng());
    assert_eq!(stage.state.wave, 2);
    assert_eq!(stage.state.wave_timer, 0);
    assert_eq!(stage.cues, vec![Cue::NextWave]);
}

#[test]
fn direct_spawns_into_stage() {
    let mut stage = init_stage(0);
    stage.state.wave = 3;
    stage.state.wave_timer = 25;
    direct(&mut stage, &mut seeded_rng());
    assert_eq!(stage.formation(FormationKind::Shooter).active_count(), 5);
    assert_eq!(stage.active_enemies(), 5);
    assert_eq!(stage.state.wave, 3);
}

#[test]
fn direct_wins_on_last_wave() {
    let mut stage = init_stage(0);
    stage.state.wave = 5;
    stage.state.wave_timer = 801;
    stage.state.score = 40;
    direct(&mut stage, &mut seeded_rng());
    assert_eq!(stage.state.status, GameStatus::GameOver);
    assert_eq!(stage.state.score, 1040);
    assert_eq!(stage.cues, vec![Cue::Win]);
    assert_eq!(stage.active_enemies(), 0);
}
