//! Stamina ledger: пул выносливости бойца
//!
//! Мутации всегда клампятся в `[0, max]`. Регенерация и расход защиты
//! применяются дискретно, раз в `StaminaConfig::interval`, и только пока
//! активен соответствующий режим восстановления.

use bevy::prelude::*;
use serde::Serialize;
use std::time::Duration;

use crate::config::StaminaConfig;

/// Режим восстановления stamina (ровно один активен)
///
/// UI использует его для индикатора "отдыхает/двигается/держит блок".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMode {
    /// Атакует, получает удар, повержен или просто стоит с нажатыми кнопками
    #[default]
    Suspended,
    /// Idle без какого-либо ввода
    Resting,
    /// Принято горизонтальное движение
    Moving,
    /// Защита: stamina тратится
    Guarding,
}

/// Результат `Stamina::advance` за один тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaminaTick {
    /// Интервал ещё не прошёл (или режим только что сменился)
    Idle,
    Regenerated,
    Drained,
    /// Расход защиты опустошил пул: защиту нужно снять
    Exhausted,
}

/// Выносливость бойца
///
/// Инвариант: 0.0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
    recovery: RecoveryMode,
    /// Начало текущего интервала восстановления (время матча)
    interval_started_at: Duration,
}

impl Default for Stamina {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Stamina {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            recovery: RecoveryMode::Suspended,
            interval_started_at: Duration::ZERO,
        }
    }

    /// Списывает `amount` (отрицательное значение = возврат)
    ///
    /// Возвращает `true`, если после списания stamina осталась или это был возврат.
    pub fn consume(&mut self, amount: f32) -> bool {
        self.current = (self.current - amount).clamp(0.0, self.max);
        self.current > 0.0 || amount <= 0.0
    }

    pub fn refund(&mut self, amount: f32) {
        self.consume(-amount);
    }

    pub fn has_at_least(&self, cost: f32) -> bool {
        self.current >= cost
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn recovery(&self) -> RecoveryMode {
        self.recovery
    }

    /// Продвигает таймер восстановления до `now` в режиме `mode`
    ///
    /// Смена режима перезапускает интервал: частичные интервалы не переносятся.
    /// После применённого интервала отсчёт начинается заново от `now` (без догоняния).
    pub fn advance(&mut self, mode: RecoveryMode, now: Duration, config: &StaminaConfig) -> StaminaTick {
        if mode != self.recovery {
            self.recovery = mode;
            self.interval_started_at = now;
            return StaminaTick::Idle;
        }

        if mode == RecoveryMode::Suspended || now.saturating_sub(self.interval_started_at) < config.interval() {
            return StaminaTick::Idle;
        }
        self.interval_started_at = now;

        match mode {
            RecoveryMode::Resting => {
                self.refund(config.idle_regen);
                StaminaTick::Regenerated
            }
            RecoveryMode::Moving => {
                self.refund(config.movement_regen);
                StaminaTick::Regenerated
            }
            RecoveryMode::Guarding => {
                if self.consume(config.defend_drain) {
                    StaminaTick::Drained
                } else {
                    StaminaTick::Exhausted
                }
            }
            RecoveryMode::Suspended => StaminaTick::Idle,
        }
    }

    /// Полный пул и сброшенный режим (rematch)
    pub fn reset(&mut self) {
        *self = Self::new(self.max);
    }
}
