//! Состояние бойца: один tagged enum вместо строки + булевых флагов
//!
//! `is_attacking` / `is_defending` / `is_hit` выводятся из варианта,
//! рассинхронизация флагов невозможна по построению.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Punch,
    Kick,
}

impl AttackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackKind::Punch => "punch",
            AttackKind::Kick => "kick",
        }
    }
}

/// Состояние бойца
///
/// Таймеры (`ends_at`): абсолютное время матча, пауза их замораживает.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FighterState {
    #[default]
    Idle,
    Walking,
    Jumping,
    AttackingPunch { ends_at: Duration },
    AttackingKick { ends_at: Duration },
    Defending,
    /// Окно реакции на удар: без управления и без новых попаданий
    Hit { ends_at: Duration },
    /// Терминальное до reset
    Defeated,
}

impl FighterState {
    pub fn attacking(kind: AttackKind, ends_at: Duration) -> Self {
        match kind {
            AttackKind::Punch => FighterState::AttackingPunch { ends_at },
            AttackKind::Kick => FighterState::AttackingKick { ends_at },
        }
    }

    /// Состояние покоя: на земле Idle, в воздухе Jumping
    pub fn at_rest(on_ground: bool) -> Self {
        if on_ground {
            FighterState::Idle
        } else {
            FighterState::Jumping
        }
    }

    pub fn is_attacking(&self) -> bool {
        self.attack_kind().is_some()
    }

    pub fn is_defending(&self) -> bool {
        matches!(self, FighterState::Defending)
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, FighterState::Hit { .. })
    }

    pub fn is_defeated(&self) -> bool {
        matches!(self, FighterState::Defeated)
    }

    pub fn attack_kind(&self) -> Option<AttackKind> {
        match self {
            FighterState::AttackingPunch { .. } => Some(AttackKind::Punch),
            FighterState::AttackingKick { .. } => Some(AttackKind::Kick),
            _ => None,
        }
    }

    /// Время истечения временного состояния (атака / hit)
    pub fn expires_at(&self) -> Option<Duration> {
        match *self {
            FighterState::AttackingPunch { ends_at }
            | FighterState::AttackingKick { ends_at }
            | FighterState::Hit { ends_at } => Some(ends_at),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FighterState::Idle => "idle",
            FighterState::Walking => "walking",
            FighterState::Jumping => "jumping",
            FighterState::AttackingPunch { .. } => "attacking_punch",
            FighterState::AttackingKick { .. } => "attacking_kick",
            FighterState::Defending => "defending",
            FighterState::Hit { .. } => "hit",
            FighterState::Defeated => "defeated",
        }
    }
}
