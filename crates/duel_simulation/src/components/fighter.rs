//! Базовые компоненты бойца: Fighter, Body, Health

use bevy::math::Rect;
use bevy::prelude::*;
use serde::Serialize;
use std::time::Duration;

use crate::combat::{ComboBook, ComboMatcher, FighterState, Stamina};
use crate::components::FighterInput;
use crate::config::DuelConfig;

/// Слот бойца в матче (всегда ровно двое)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Reflect)]
pub enum FighterId {
    One,
    Two,
}

impl FighterId {
    pub const ALL: [FighterId; 2] = [FighterId::One, FighterId::Two];

    /// 0-based индекс (для массивов вводов)
    pub fn index(self) -> usize {
        match self {
            FighterId::One => 0,
            FighterId::Two => 1,
        }
    }

    /// Номер игрока для UI: 1 или 2
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(FighterId::One),
            2 => Some(FighterId::Two),
            _ => None,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            FighterId::One => FighterId::Two,
            FighterId::Two => FighterId::One,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Reflect)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Знак направления по оси x
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Боец (маркер + идентичность)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Fighter {
    pub id: FighterId,
    pub facing: Facing,
    /// Начало последней атаки (rate limit)
    pub last_attack_at: Option<Duration>,
}

/// Кинематическое тело (y растёт вниз, `position` = левый верхний угол)
///
/// Инвариант после physics step: `on_ground ⇒ velocity.y == 0`,
/// позиция внутри арены.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
}

impl Body {
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.position, self.position + self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }
}

/// Здоровье бойца
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Возвращает фактически снятое здоровье
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).clamp(0.0, self.max);
        before - self.current
    }

    /// Возвращает фактически восстановленное здоровье
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).clamp(0.0, self.max);
        self.current - before
    }
}

/// Полный набор компонентов бойца в начальном состоянии
#[derive(Bundle)]
pub struct FighterBundle {
    pub fighter: Fighter,
    pub body: Body,
    pub health: Health,
    pub stamina: Stamina,
    pub state: FighterState,
    pub combo: ComboMatcher,
    pub input: FighterInput,
}

impl FighterBundle {
    /// Стартовая расстановка: первый слева лицом вправо, второй справа лицом влево
    pub fn spawn(id: FighterId, config: &DuelConfig, book: &ComboBook) -> Self {
        let size = Vec2::new(config.fighter.width, config.fighter.height);
        let y = config.arena.ground_y() - size.y;
        let (x, facing) = match id {
            FighterId::One => (config.arena.spawn_margin, Facing::Right),
            FighterId::Two => (config.arena.width - config.arena.spawn_margin - size.x, Facing::Left),
        };

        Self {
            fighter: Fighter {
                id,
                facing,
                last_attack_at: None,
            },
            body: Body {
                position: Vec2::new(x, y),
                velocity: Vec2::ZERO,
                size,
                on_ground: true,
            },
            health: Health::new(config.fighter.max_health),
            stamina: Stamina::new(config.fighter.max_stamina),
            state: FighterState::Idle,
            combo: ComboMatcher::new(book),
            input: FighterInput::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps() {
        let mut health = Health::new(100.0);
        assert_eq!(health.take_damage(30.0), 30.0);
        assert_eq!(health.take_damage(500.0), 70.0);
        assert!(!health.is_alive());
        assert_eq!(health.heal(20.0), 20.0);
        assert_eq!(health.heal(500.0), 80.0);
        assert_eq!(health.current, 100.0);
    }

    #[test]
    fn test_fighter_numbers() {
        assert_eq!(FighterId::from_number(2), Some(FighterId::Two));
        assert_eq!(FighterId::from_number(3), None);
        assert_eq!(FighterId::One.number(), 1);
        assert_eq!(FighterId::Two.opponent(), FighterId::One);
    }

    #[test]
    fn test_spawn_layout() {
        let config = DuelConfig::default();
        let book = ComboBook::from_specs(&config.combos).unwrap();

        let one = FighterBundle::spawn(FighterId::One, &config, &book);
        let two = FighterBundle::spawn(FighterId::Two, &config, &book);

        assert_eq!(one.body.position, Vec2::new(200.0, 380.0));
        assert_eq!(two.body.position, Vec2::new(940.0, 380.0));
        assert_eq!(one.fighter.facing, Facing::Right);
        assert_eq!(two.fighter.facing, Facing::Left);
        assert!(one.body.on_ground);
    }
}
