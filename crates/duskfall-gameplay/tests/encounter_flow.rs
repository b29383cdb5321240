//! Multi-tick encounter scenarios driven through player input only.

use duskfall_common::Direction;
use duskfall_gameplay::{
    CombatActor, EffectLog, Encounter, EncounterConfig, EncounterMode, EncounterStatus, EnemyKind,
    GameEvent, PlayerCombatant, PlayerInput, PlayerView, SoundCue,
};

const DT: f32 = 1.0 / 60.0;

/// Player that cannot lose and kills with any landed hit.
fn overpowered() -> EncounterConfig {
    EncounterConfig {
        player_health: 10_000,
        player_damage: 1_000,
        coin_interval: 1_000.0,
        ..EncounterConfig::default()
    }
}

/// Chases the nearest living enemy and swings when in reach.
fn hunt(encounter: &Encounter) -> PlayerInput {
    let player = encounter.player();
    let bounds = player.bounds();
    let Some(target) = encounter
        .enemies()
        .iter()
        .filter(|c| !c.enemy.is_dead())
        .map(|c| c.enemy.bounds())
        .min_by(|a, b| {
            let da = (a.center().x - bounds.center().x).abs();
            let db = (b.center().x - bounds.center().x).abs();
            da.total_cmp(&db)
        })
    else {
        return PlayerInput::NONE;
    };

    let toward = Direction::toward(bounds.center().x, target.center().x);
    if player.direction() != toward {
        return PlayerInput::walk(toward);
    }
    if player.attack_box().collides_with(&target) {
        return PlayerInput {
            attack: true,
            ..PlayerInput::NONE
        };
    }
    PlayerInput::walk(toward)
}

#[test]
fn test_cycle_alternates_minotaur_and_skeleton() {
    let mut encounter = Encounter::new(overpowered(), EncounterMode::Cycle).expect("valid config");
    let mut effects = EffectLog::new();
    let mut spawned = Vec::new();
    let mut removed = 0;

    for _ in 0..(240.0 / DT) as usize {
        let input = hunt(&encounter);
        encounter.tick(DT, input, &mut effects);
        for event in encounter.events().drain() {
            match event {
                GameEvent::EnemySpawned { kind, .. } => spawned.push(kind),
                GameEvent::EnemyRemoved { .. } => removed += 1,
                _ => {},
            }
        }
        assert!(encounter.enemies().len() <= 1);
        if spawned.len() >= 3 {
            break;
        }
    }

    assert_eq!(
        &spawned[..3],
        &[EnemyKind::Minotaur, EnemyKind::Skeleton, EnemyKind::Minotaur]
    );
    assert!(removed >= 2);
    assert!(effects.sound_count(SoundCue::EnemyDeath) >= 2);
    assert_eq!(encounter.status(), EncounterStatus::Running);
}

fn fight_boss(mode: EncounterMode, boss: EnemyKind) {
    let mut encounter = Encounter::new(overpowered(), mode).expect("valid config");
    let mut effects = EffectLog::new();
    let mut events = Vec::new();
    let mut status = EncounterStatus::Running;

    for _ in 0..(240.0 / DT) as usize {
        let input = hunt(&encounter);
        status = encounter.tick(DT, input, &mut effects);
        events.extend(encounter.events().drain());
        if status != EncounterStatus::Running {
            break;
        }
    }

    assert_eq!(status, EncounterStatus::Victory);
    assert!(encounter.enemies().is_empty());
    assert!(encounter.coins().is_empty());
    assert!(events.contains(&GameEvent::EncounterComplete { boss }));
    let spawns = events
        .iter()
        .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
        .count();
    assert_eq!(spawns, 1);
}

#[test]
fn test_samurai_fight_ends_in_victory() {
    fight_boss(EncounterMode::Samurai, EnemyKind::Samurai);
}

#[test]
fn test_knight_fight_ends_in_victory() {
    fight_boss(EncounterMode::Knight, EnemyKind::Knight);
}

#[test]
fn test_idle_player_eventually_falls_to_the_knight() {
    let config = EncounterConfig {
        player_health: 2,
        ..EncounterConfig::default()
    };
    let mut encounter = Encounter::new(config, EncounterMode::Knight).expect("valid config");
    let mut effects = EffectLog::new();
    let mut status = EncounterStatus::Running;
    let mut player_hits = 0;

    for _ in 0..(240.0 / DT) as usize {
        status = encounter.tick(DT, PlayerInput::NONE, &mut effects);
        player_hits += encounter
            .events()
            .drain()
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerDamaged { .. }))
            .count();
        if status != EncounterStatus::Running {
            break;
        }
    }

    assert_eq!(status, EncounterStatus::Defeat);
    assert_eq!(player_hits, 2);
    assert!(encounter.player().is_dead());
}

#[test]
fn test_snapshot_resume_continues_the_run() {
    let mut encounter = Encounter::new(overpowered(), EncounterMode::Cycle).expect("valid config");
    let mut effects = EffectLog::new();
    for _ in 0..120 {
        let input = hunt(&encounter);
        encounter.tick(DT, input, &mut effects);
    }

    let snapshot = encounter.snapshot();
    let json = serde_json::to_string(&snapshot).expect("serialize");
    let restored = Encounter::from_snapshot(overpowered(), &serde_json::from_str(&json).expect("parse"))
        .expect("restore");

    assert_eq!(restored.snapshot(), snapshot);
    assert_eq!(restored.next_spawn(), encounter.next_spawn());
    assert_eq!(restored.enemies().len(), encounter.enemies().len());
}
