//! Нормализованный ввод бойца на один тик
//!
//! Захват клавиатуры/геймпада вне ядра: контроллер просто пишет
//! `FighterInput` перед каждым тиком.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::AttackKind;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct FighterInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub punch: bool,
    pub kick: bool,
    pub defend: bool,
}

/// Приоритет ввода (для debug overlay)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputPriority {
    Attack,
    Defend,
    Movement,
    None,
}

impl InputPriority {
    pub fn label(&self) -> &'static str {
        match self {
            InputPriority::Attack => "ATTACK",
            InputPriority::Defend => "DEFEND",
            InputPriority::Movement => "MOVEMENT",
            InputPriority::None => "NONE",
        }
    }
}

impl FighterInput {
    pub fn is_idle(&self) -> bool {
        !(self.left || self.right || self.jump || self.punch || self.kick || self.defend)
    }

    pub fn wants_attack(&self) -> bool {
        self.punch || self.kick
    }

    /// Запрошенная атака: удар рукой приоритетнее удара ногой
    pub fn requested_attack(&self) -> Option<AttackKind> {
        if self.punch {
            Some(AttackKind::Punch)
        } else if self.kick {
            Some(AttackKind::Kick)
        } else {
            None
        }
    }

    /// Направление по x: -1, 0 или 1 (левое приоритетнее)
    pub fn horizontal(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }

    pub fn priority(&self) -> InputPriority {
        if self.wants_attack() {
            InputPriority::Attack
        } else if self.defend {
            InputPriority::Defend
        } else if self.left || self.right || self.jump {
            InputPriority::Movement
        } else {
            InputPriority::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punch_wins_over_kick() {
        let input = FighterInput {
            punch: true,
            kick: true,
            ..default()
        };
        assert_eq!(input.requested_attack(), Some(AttackKind::Punch));
    }

    #[test]
    fn test_priority_order() {
        let mut input = FighterInput {
            left: true,
            defend: true,
            kick: true,
            ..default()
        };
        assert_eq!(input.priority(), InputPriority::Attack);
        input.kick = false;
        assert_eq!(input.priority(), InputPriority::Defend);
        input.defend = false;
        assert_eq!(input.priority().label(), "MOVEMENT");
        assert!(FighterInput::default().is_idle());
    }

    #[test]
    fn test_left_has_priority() {
        let input = FighterInput {
            left: true,
            right: true,
            ..default()
        };
        assert_eq!(input.horizontal(), -1.0);
    }
}
