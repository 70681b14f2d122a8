//! Применение урона и knockback к бойцу
//!
//! Модификаторы:
//! - защита снимает фиксированную долю урона и заменяет knockback фиксированной скоростью
//! - на земле удар подбрасывает цель, в воздухе только ограничивает скорость подъёма

use bevy::prelude::*;
use std::time::Duration;

use super::state::FighterState;
use crate::components::{Body, FighterId, Health};
use crate::config::DuelConfig;

/// Событие: урон нанесен
///
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: FighterId,
    pub target: FighterId,
    /// Урон после модификатора защиты
    pub damage: f32,
    pub defended: bool,
    /// Итоговая горизонтальная скорость цели
    pub knockback: f32,
    pub target_defeated: bool,
}

/// Событие: здоровье бойца дошло до нуля
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FighterDefeated {
    pub fighter: FighterId,
    pub by: FighterId,
}

/// Параметры одного попадания
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub damage: f32,
    /// Множитель базовой скорости knockback (атака или комбо)
    pub knockback: f32,
    /// x атакующего в момент захвата (направление отброса)
    pub attacker_x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub damage: f32,
    pub defended: bool,
    pub knockback: f32,
    pub defeated: bool,
}

/// Направление отброса: от атакующего
pub fn knockback_direction(attacker_x: f32, target_x: f32) -> f32 {
    if attacker_x > target_x {
        -1.0
    } else {
        1.0
    }
}

/// Применяет попадание к цели
///
/// Защита оценивается по состоянию цели в момент попадания.
pub fn apply_damage(
    health: &mut Health,
    body: &mut Body,
    state: &mut FighterState,
    strike: &Strike,
    now: Duration,
    config: &DuelConfig,
) -> HitOutcome {
    let defended = state.is_defending();
    let damage = if defended {
        strike.damage * (1.0 - config.defense.damage_reduction)
    } else {
        strike.damage
    };

    health.take_damage(damage);

    let direction = knockback_direction(strike.attacker_x, body.position.x);
    let speed = if defended {
        config.knockback.defense_velocity
    } else {
        config.knockback.base_velocity * strike.knockback
    };
    // Собственная скорость цели полностью заменяется отбросом
    body.velocity.x = direction * speed;

    if body.on_ground {
        body.velocity.y = -config.knockback.hit_lift;
        body.on_ground = false;
    } else {
        body.velocity.y = body.velocity.y.min(-config.knockback.airborne_lift);
    }

    let defeated = !health.is_alive();
    *state = if defeated {
        FighterState::Defeated
    } else {
        FighterState::Hit {
            ends_at: now + config.timings.hit_reaction(),
        }
    };

    HitOutcome {
        damage,
        defended,
        knockback: body.velocity.x,
        defeated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> (Health, Body, FighterState) {
        let body = Body {
            position: Vec2::new(50.0, 380.0),
            velocity: Vec2::new(-5.0, 0.0),
            size: Vec2::new(60.0, 120.0),
            on_ground: true,
        };
        (Health::new(100.0), body, FighterState::Walking)
    }

    fn punch_from(x: f32) -> Strike {
        Strike {
            damage: 10.0,
            knockback: 0.25,
            attacker_x: x,
        }
    }

    #[test]
    fn test_plain_hit() {
        let config = DuelConfig::default();
        let (mut health, mut body, mut state) = target();
        let now = Duration::from_millis(1000);

        let outcome = apply_damage(&mut health, &mut body, &mut state, &punch_from(0.0), now, &config);

        assert_eq!(health.current, 90.0);
        assert_eq!(outcome.damage, 10.0);
        assert!(!outcome.defended);
        assert_eq!(body.velocity.x, 1.5);
        assert_eq!(body.velocity.y, -12.0);
        assert!(!body.on_ground);
        assert_eq!(state, FighterState::Hit { ends_at: Duration::from_millis(1500) });
    }

    #[test]
    fn test_knockback_points_away_from_attacker() {
        let config = DuelConfig::default();
        let (mut health, mut body, mut state) = target();

        apply_damage(&mut health, &mut body, &mut state, &punch_from(300.0), Duration::ZERO, &config);
        assert!(body.velocity.x < 0.0);
    }

    #[test]
    fn test_defending_halves_damage_and_uses_fixed_knockback() {
        let config = DuelConfig::default();
        let (mut health, mut body, _) = target();
        let mut state = FighterState::Defending;
        let strike = Strike {
            damage: 27.0,
            knockback: 1.3,
            attacker_x: 0.0,
        };

        let outcome = apply_damage(&mut health, &mut body, &mut state, &strike, Duration::ZERO, &config);

        assert!(outcome.defended);
        assert_eq!(outcome.damage, 13.5);
        assert_eq!(health.current, 86.5);
        assert_eq!(body.velocity.x, 42.0);
    }

    #[test]
    fn test_airborne_hit_only_caps_rise() {
        let config = DuelConfig::default();
        let (mut health, mut body, mut state) = target();
        body.on_ground = false;
        body.velocity.y = -10.0;

        apply_damage(&mut health, &mut body, &mut state, &punch_from(0.0), Duration::ZERO, &config);
        assert_eq!(body.velocity.y, -10.0);

        body.velocity.y = 4.0;
        state = FighterState::Jumping;
        apply_damage(&mut health, &mut body, &mut state, &punch_from(0.0), Duration::ZERO, &config);
        assert_eq!(body.velocity.y, -3.0);
    }

    #[test]
    fn test_lethal_hit_defeats() {
        let config = DuelConfig::default();
        let (mut health, mut body, mut state) = target();
        health.current = 5.0;

        let outcome = apply_damage(&mut health, &mut body, &mut state, &punch_from(0.0), Duration::ZERO, &config);
        assert!(outcome.defeated);
        assert_eq!(health.current, 0.0);
        assert_eq!(state, FighterState::Defeated);
    }
}
