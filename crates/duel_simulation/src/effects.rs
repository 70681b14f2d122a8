//! Визуальные эффекты боя (только данные, рендер вне ядра)
//!
//! Системы пишут `EffectEvent`, контроллер переносит их в `EffectArena`:
//! фиксированный набор слотов на матч. Истёкшие слоты переиспользуются,
//! при переполнении вытесняется самый старый эффект.

use bevy::prelude::*;
use serde::Serialize;
use std::time::Duration;

use crate::combat::{AttackKind, ComboDefinition};
use crate::components::{Body, Facing, FighterId};
use crate::config::EffectsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Вспышка зоны удара (прямоугольник)
    Attack,
    /// Попадание (круг)
    Hit,
    /// Срабатывание комбо (круг + имя)
    Combo,
    /// Лечение (круг + величина)
    Heal,
}

/// Событие эффекта
///
/// `extent`: ширина/высота для Attack, радиус в `x` для круглых эффектов.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EffectEvent {
    pub kind: EffectKind,
    pub fighter: FighterId,
    pub origin: Vec2,
    pub extent: Vec2,
    pub color: String,
    pub label: Option<String>,
    pub amount: Option<f32>,
    pub started_at: Duration,
    pub duration: Duration,
}

impl EffectEvent {
    pub fn is_active(&self, now: Duration) -> bool {
        now < self.started_at + self.duration
    }

    /// Вспышка атаки перед бойцом на уровне середины тела
    pub fn attack(fighter: FighterId, body: &Body, facing: Facing, kind: AttackKind, now: Duration, config: &EffectsConfig) -> Self {
        let [width, height] = config.attack_size;
        let x = match facing {
            Facing::Right => body.right(),
            Facing::Left => body.left() - width,
        };
        let color = match kind {
            AttackKind::Punch => &config.punch_color,
            AttackKind::Kick => &config.kick_color,
        };

        Self {
            kind: EffectKind::Attack,
            fighter,
            origin: Vec2::new(x, body.center().y),
            extent: Vec2::new(width, height),
            color: color.clone(),
            label: Some(kind.as_str().to_string()),
            amount: None,
            started_at: now,
            duration: Duration::from_millis(config.attack_ms),
        }
    }

    /// Попадание: `fighter` = получивший удар
    pub fn hit(fighter: FighterId, body: &Body, damage: f32, now: Duration, config: &EffectsConfig) -> Self {
        Self {
            kind: EffectKind::Hit,
            fighter,
            origin: body.center(),
            extent: Vec2::splat(config.hit_radius),
            color: config.hit_color.clone(),
            label: None,
            amount: Some(damage),
            started_at: now,
            duration: Duration::from_millis(config.hit_ms),
        }
    }

    pub fn combo(fighter: FighterId, body: &Body, combo: &ComboDefinition, now: Duration, config: &EffectsConfig) -> Self {
        Self {
            kind: EffectKind::Combo,
            fighter,
            origin: body.center(),
            extent: Vec2::splat(config.combo_radius),
            color: combo.color.clone(),
            label: Some(combo.name.clone()),
            amount: None,
            started_at: now,
            duration: Duration::from_millis(config.combo_ms),
        }
    }

    pub fn heal(fighter: FighterId, body: &Body, amount: f32, now: Duration, config: &EffectsConfig) -> Self {
        Self {
            kind: EffectKind::Heal,
            fighter,
            origin: body.center(),
            extent: Vec2::splat(config.heal_radius),
            color: config.heal_color.clone(),
            label: None,
            amount: Some(amount),
            started_at: now,
            duration: Duration::from_millis(config.heal_ms),
        }
    }
}

/// Пул эффектов матча с фиксированным числом слотов
#[derive(Resource, Debug, Clone)]
pub struct EffectArena {
    slots: Vec<Option<EffectEvent>>,
}

impl EffectArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Кладёт эффект в свободный/истёкший слот, иначе вытесняет самый старый
    pub fn push(&mut self, effect: EffectEvent, now: Duration) -> usize {
        let free = self
            .slots
            .iter()
            .position(|slot| slot.as_ref().map_or(true, |existing| !existing.is_active(now)));

        let index = free.unwrap_or_else(|| {
            self.slots
                .iter()
                .enumerate()
                .min_by_key(|(_, slot)| slot.as_ref().map(|existing| existing.started_at))
                .map(|(index, _)| index)
                .unwrap_or(0)
        });

        self.slots[index] = Some(effect);
        index
    }

    pub fn active(&self, now: Duration) -> impl Iterator<Item = &EffectEvent> {
        self.slots
            .iter()
            .flatten()
            .filter(move |effect| effect.is_active(now))
    }

    pub fn active_count(&self, now: Duration) -> usize {
        self.active(now).count()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

impl Default for EffectArena {
    fn default() -> Self {
        Self::new(EffectsConfig::default().slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Body {
        Body {
            position: Vec2::new(100.0, 380.0),
            velocity: Vec2::ZERO,
            size: Vec2::new(60.0, 120.0),
            on_ground: true,
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_attack_effect_geometry() {
        let config = EffectsConfig::default();
        let right = EffectEvent::attack(FighterId::One, &body(), Facing::Right, AttackKind::Kick, ms(0), &config);
        assert_eq!(right.origin, Vec2::new(160.0, 440.0));
        assert_eq!(right.color, "#4ecdc4");

        let left = EffectEvent::attack(FighterId::One, &body(), Facing::Left, AttackKind::Punch, ms(0), &config);
        assert_eq!(left.origin.x, 60.0);
        assert_eq!(left.duration, ms(150));
    }

    #[test]
    fn test_expired_slots_are_reused() {
        let config = EffectsConfig::default();
        let mut arena = EffectArena::new(2);

        let first = arena.push(EffectEvent::hit(FighterId::One, &body(), 10.0, ms(0), &config), ms(0));
        let second = arena.push(EffectEvent::hit(FighterId::Two, &body(), 10.0, ms(50), &config), ms(50));
        assert_ne!(first, second);
        assert_eq!(arena.active_count(ms(100)), 2);

        // Первый эффект (200 мс) истёк к 250
        let third = arena.push(EffectEvent::hit(FighterId::One, &body(), 5.0, ms(250), &config), ms(250));
        assert_eq!(third, first);
        assert_eq!(arena.active_count(ms(250)), 1);
    }

    #[test]
    fn test_full_arena_evicts_oldest() {
        let config = EffectsConfig::default();
        let mut arena = EffectArena::new(2);

        arena.push(EffectEvent::heal(FighterId::One, &body(), 20.0, ms(0), &config), ms(0));
        let newer = arena.push(EffectEvent::heal(FighterId::One, &body(), 20.0, ms(10), &config), ms(10));
        let evicted = arena.push(EffectEvent::heal(FighterId::Two, &body(), 20.0, ms(20), &config), ms(20));

        assert_ne!(evicted, newer);
        assert_eq!(arena.capacity(), 2);
        assert_eq!(arena.active_count(ms(20)), 2);

        arena.clear();
        assert_eq!(arena.active_count(ms(20)), 0);
    }
}
