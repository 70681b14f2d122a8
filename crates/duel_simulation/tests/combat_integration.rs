//! Combat integration test
//!
//! Полный матч через `DuelMatch::tick` (ECS schedule + resolver + round end).
//!
//! Проверяем:
//! - удар на дистанции: урон, hit-реакция, knockback, длительность атаки
//! - windStrike: бонус урона при попадании, cooldown, очистка истории
//! - поражение завершает матч, дальнейшие тики ничего не меняют
//! - пауза замораживает таймеры

use std::time::Duration;

use bevy::math::Vec2;
use duel_simulation::*;

const DT: Duration = Duration::from_millis(20);

fn new_duel() -> DuelMatch {
    DuelMatch::new(DuelConfig::default()).expect("default config is valid")
}

fn idle() -> FighterInput {
    FighterInput::default()
}

fn punch() -> FighterInput {
    FighterInput {
        punch: true,
        ..Default::default()
    }
}

fn kick() -> FighterInput {
    FighterInput {
        kick: true,
        ..Default::default()
    }
}

/// Телепорт бойца (x, на земле)
fn place(duel: &mut DuelMatch, id: FighterId, x: f32) {
    let entity = duel.fighter_entity(id);
    let mut body = duel.world_mut().get_mut::<Body>(entity).expect("fighter has a body");
    body.position.x = x;
    body.velocity = Vec2::ZERO;
}

fn set_health(duel: &mut DuelMatch, id: FighterId, value: f32) {
    let entity = duel.fighter_entity(id);
    duel.world_mut().get_mut::<Health>(entity).expect("fighter has health").current = value;
}

fn snapshot(duel: &DuelMatch, id: FighterId) -> FighterSnapshot {
    duel.snapshot(id).expect("fighter exists")
}

/// Тикаем без ввода, пока часы не дойдут до `until`
fn idle_until(duel: &mut DuelMatch, until: Duration) {
    while duel.now() < until {
        duel.tick(DT, [idle(), idle()]);
    }
}

#[test]
fn test_punch_at_range_hits_and_knocks_back() {
    let mut duel = new_duel();
    place(&mut duel, FighterId::One, 100.0);
    place(&mut duel, FighterId::Two, 150.0);

    let report = duel.tick(DT, [punch(), idle()]);

    assert_eq!(report.attacks.len(), 1);
    assert_eq!(report.hits.len(), 1);
    assert_eq!(report.hits[0].attacker, FighterId::One);
    assert_eq!(report.hits[0].damage, 10.0);

    let target = snapshot(&duel, FighterId::Two);
    assert_eq!(target.health, 90.0);
    assert!(target.is_hit);
    assert!(target.vx > 0.0, "knockback must push away from the attacker");

    // Тела пересекались: после разведения не пересекаются
    let attacker = snapshot(&duel, FighterId::One);
    assert!(attacker.x + 60.0 <= target.x + 0.001);

    // Атака длится 200 мс с момента начала (20 мс)
    idle_until(&mut duel, Duration::from_millis(200));
    assert!(snapshot(&duel, FighterId::One).is_attacking);
    duel.tick(DT, [idle(), idle()]);
    assert!(!snapshot(&duel, FighterId::One).is_attacking);
}

#[test]
fn test_hit_target_is_not_hit_twice() {
    let mut duel = new_duel();
    place(&mut duel, FighterId::One, 300.0);
    place(&mut duel, FighterId::Two, 370.0);

    duel.tick(DT, [punch(), idle()]);
    idle_until(&mut duel, Duration::from_millis(300));

    // Новый удар, пока цель ещё в окне hit (500 мс)
    place(&mut duel, FighterId::Two, 370.0);
    let report = duel.tick(DT, [punch(), idle()]);
    assert_eq!(report.attacks.len(), 1);
    assert!(report.hits.is_empty());
    assert_eq!(snapshot(&duel, FighterId::Two).health, 90.0);
}

#[test]
fn test_wind_strike_lands_with_bonus() {
    let mut duel = new_duel();

    // Два удара рукой в пустоту (бойцы на стартовых позициях далеко)
    duel.tick(DT, [punch(), idle()]);
    idle_until(&mut duel, Duration::from_millis(220));
    duel.tick(DT, [punch(), idle()]);
    idle_until(&mut duel, Duration::from_millis(440));

    assert_eq!(snapshot(&duel, FighterId::Two).health, 100.0);
    assert_eq!(
        snapshot(&duel, FighterId::One).combo_history,
        vec![ComboAction::Punch, ComboAction::Punch]
    );

    // Цель в зоне удара ногой
    let attacker_x = snapshot(&duel, FighterId::One).x;
    place(&mut duel, FighterId::Two, attacker_x + 70.0);

    let report = duel.tick(DT, [kick(), idle()]);

    assert_eq!(report.combos.len(), 1);
    assert_eq!(report.combos_landed.len(), 1);
    assert_eq!(report.combos_landed[0].bonus_damage, 12.0);

    let target = snapshot(&duel, FighterId::Two);
    assert_eq!(target.health, 73.0);
    assert!(target.vx > 0.0);

    let attacker = snapshot(&duel, FighterId::One);
    assert!(attacker.combo_history.is_empty());
    assert_eq!(attacker.pending_combo, None);
    let cooldown = attacker.cooldown("windStrike").expect("windStrike is configured");
    assert!(cooldown.remaining_ms > 4900);

    let effects = duel.active_effects();
    assert!(effects.iter().any(|effect| effect.kind == EffectKind::Combo));
    assert!(effects.iter().any(|effect| effect.kind == EffectKind::Hit));
}

#[test]
fn test_missed_combo_is_forfeited() {
    let mut duel = new_duel();

    duel.tick(DT, [punch(), idle()]);
    idle_until(&mut duel, Duration::from_millis(220));
    duel.tick(DT, [punch(), idle()]);
    idle_until(&mut duel, Duration::from_millis(440));
    let report = duel.tick(DT, [kick(), idle()]);
    assert_eq!(report.combos.len(), 1);
    assert!(snapshot(&duel, FighterId::One).pending_combo.is_some());

    let mut forfeits = 0;
    while duel.now() < Duration::from_millis(800) {
        forfeits += duel.tick(DT, [idle(), idle()]).forfeits.len();
    }

    assert_eq!(forfeits, 1);
    let attacker = snapshot(&duel, FighterId::One);
    assert_eq!(attacker.pending_combo, None);
    assert!(attacker.cooldown("windStrike").unwrap().remaining_ms > 0);
    assert_eq!(snapshot(&duel, FighterId::Two).health, 100.0);
}

#[test]
fn test_defending_target_takes_half_damage() {
    let mut duel = new_duel();
    place(&mut duel, FighterId::One, 300.0);
    place(&mut duel, FighterId::Two, 370.0);

    let guard = FighterInput {
        defend: true,
        ..Default::default()
    };
    let report = duel.tick(DT, [kick(), guard]);

    assert_eq!(report.hits.len(), 1);
    assert!(report.hits[0].defended);
    assert_eq!(report.hits[0].damage, 7.5);

    let target = snapshot(&duel, FighterId::Two);
    assert_eq!(target.health, 92.5);
    assert_eq!(target.vx, 42.0);
}

#[test]
fn test_defeat_ends_match() {
    let mut duel = new_duel();
    place(&mut duel, FighterId::One, 300.0);
    place(&mut duel, FighterId::Two, 370.0);
    set_health(&mut duel, FighterId::One, 5.0);

    let report = duel.tick(DT, [idle(), punch()]);

    assert_eq!(report.defeats.len(), 1);
    assert_eq!(report.round_ended, Some(MatchOutcome::Winner(FighterId::Two)));
    assert_eq!(duel.phase(), MatchPhase::Ended);
    assert_eq!(duel.winner(), Some(FighterId::Two));

    let loser = snapshot(&duel, FighterId::One);
    assert_eq!(loser.health, 0.0);
    assert!(loser.is_defeated);

    // Дальше тики ничего не меняют
    let before = duel.snapshots();
    let tick_before = duel.tick_count();
    for _ in 0..10 {
        let report = duel.tick(DT, [punch(), kick()]);
        assert!(report.is_empty());
    }
    assert_eq!(duel.snapshots(), before);
    assert_eq!(duel.tick_count(), tick_before);

    // Пауза после конца матча невозможна
    duel.toggle_pause();
    assert_eq!(duel.phase(), MatchPhase::Ended);
}

#[test]
fn test_double_knockout_is_draw() {
    let mut duel = new_duel();
    place(&mut duel, FighterId::One, 300.0);
    place(&mut duel, FighterId::Two, 370.0);
    set_health(&mut duel, FighterId::One, 5.0);
    set_health(&mut duel, FighterId::Two, 5.0);

    let report = duel.tick(DT, [punch(), punch()]);

    assert_eq!(report.hits.len(), 2);
    assert_eq!(report.round_ended, Some(MatchOutcome::Draw));
    assert_eq!(duel.winner(), None);
    assert!(snapshot(&duel, FighterId::One).is_defeated);
    assert!(snapshot(&duel, FighterId::Two).is_defeated);
}

#[test]
fn test_pause_freezes_timers() {
    let mut duel = new_duel();

    duel.tick(DT, [punch(), idle()]);
    idle_until(&mut duel, Duration::from_millis(120));

    duel.pause();
    assert_eq!(duel.phase(), MatchPhase::Paused);
    let frozen = duel.snapshots();

    for _ in 0..10 {
        let report = duel.tick(DT, [FighterInput { right: true, ..Default::default() }, punch()]);
        assert!(report.is_empty());
    }
    assert_eq!(duel.now(), Duration::from_millis(120));
    assert_eq!(duel.snapshots(), frozen);

    duel.toggle_pause();
    assert_eq!(duel.phase(), MatchPhase::Playing);

    // Осталось ровно 100 мс атаки
    idle_until(&mut duel, Duration::from_millis(200));
    assert!(snapshot(&duel, FighterId::One).is_attacking);
    duel.tick(DT, [idle(), idle()]);
    assert!(!snapshot(&duel, FighterId::One).is_attacking);
}

#[test]
fn test_restart_after_defeat() {
    let mut duel = new_duel();
    place(&mut duel, FighterId::One, 300.0);
    place(&mut duel, FighterId::Two, 370.0);
    set_health(&mut duel, FighterId::Two, 5.0);
    duel.tick(DT, [punch(), idle()]);
    assert_eq!(duel.phase(), MatchPhase::Ended);

    duel.restart();

    assert_eq!(duel.phase(), MatchPhase::Playing);
    assert_eq!(duel.outcome(), None);
    assert_eq!(duel.now(), Duration::ZERO);
    assert!(duel.active_effects().is_empty());

    let one = snapshot(&duel, FighterId::One);
    let two = snapshot(&duel, FighterId::Two);
    assert_eq!((one.x, two.x), (200.0, 940.0));
    assert_eq!(two.health, 100.0);
    assert_eq!(two.state, "idle");
    assert!(one.cooldowns.iter().all(|view| view.remaining_ms == 0));

    let report = duel.tick(DT, [idle(), idle()]);
    assert_eq!(report.tick, 1);
}

#[test]
fn test_snapshot_lookup_by_number() {
    let duel = new_duel();
    assert_eq!(duel.snapshot_by_number(1).map(|s| s.id), Some(FighterId::One));
    assert_eq!(duel.snapshot_by_number(2).map(|s| s.facing), Some(Facing::Left));
    assert!(duel.snapshot_by_number(0).is_none());
    assert!(duel.snapshot_by_number(3).is_none());
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = DuelConfig::default();
    config.combos.push(config.combos[0].clone());
    assert!(matches!(DuelMatch::new(config), Err(ConfigError::DuplicateId(_))));
}
