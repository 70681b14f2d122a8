//! Combo system: история действий → определение комбо
//!
//! `ComboBook` (resource): провалидированная таблица комбо с O(1) поиском
//! по последовательности. `ComboMatcher` (component): история последних
//! действий бойца, cooldown-таблица и слот "pending" комбо.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::stamina::Stamina;
use super::state::AttackKind;
use crate::config::{ComboSpec, ConfigError};

/// Максимальная длина истории действий
pub const COMBO_HISTORY_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboAction {
    Punch,
    Kick,
    Jump,
}

impl From<AttackKind> for ComboAction {
    fn from(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Punch => ComboAction::Punch,
            AttackKind::Kick => ComboAction::Kick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboCategory {
    /// Бонус применяется, когда вызвавшая атака попадает
    Offensive,
    /// Лечит владельца сразу при срабатывании, атака не выполняется
    Healing,
}

/// Индекс комбо в `ComboBook` (и в cooldown-таблице matcher'а)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComboId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct ComboDefinition {
    pub id: ComboId,
    pub key: String,
    pub name: String,
    pub sequence: Vec<ComboAction>,
    pub bonus_damage: f32,
    pub stamina_cost: f32,
    pub cooldown: Duration,
    pub knockback: f32,
    pub category: ComboCategory,
    pub requires_airborne: bool,
    pub color: String,
}

impl ComboDefinition {
    pub fn is_healing(&self) -> bool {
        self.category == ComboCategory::Healing
    }

    pub fn heal_amount(&self) -> f32 {
        (-self.bonus_damage).max(0.0)
    }
}

/// Таблица комбо матча
#[derive(Resource, Debug, Clone, Default)]
pub struct ComboBook {
    combos: Vec<ComboDefinition>,
    by_sequence: HashMap<Vec<ComboAction>, ComboId>,
}

impl ComboBook {
    /// Строит таблицу из конфига, отклоняя некорректные и неоднозначные комбо
    pub fn from_specs(specs: &[ComboSpec]) -> Result<Self, ConfigError> {
        let mut book = ComboBook::default();

        for spec in specs {
            let invalid = |reason: &'static str| ConfigError::InvalidCombo {
                key: spec.key.clone(),
                reason,
            };

            if spec.key.is_empty() {
                return Err(invalid("key must not be empty"));
            }
            if book.find(&spec.key).is_some() {
                return Err(ConfigError::DuplicateId(spec.key.clone()));
            }
            if spec.sequence.is_empty() {
                return Err(ConfigError::EmptySequence(spec.key.clone()));
            }
            if spec.sequence.len() > COMBO_HISTORY_LIMIT {
                return Err(ConfigError::SequenceTooLong {
                    key: spec.key.clone(),
                    len: spec.sequence.len(),
                    max: COMBO_HISTORY_LIMIT,
                });
            }
            if !spec.stamina_cost.is_finite() || spec.stamina_cost < 0.0 {
                return Err(invalid("stamina cost must be a non-negative number"));
            }
            if !spec.knockback.is_finite() || spec.knockback < 0.0 {
                return Err(invalid("knockback multiplier must be a non-negative number"));
            }
            if !spec.bonus_damage.is_finite() {
                return Err(invalid("bonus damage must be finite"));
            }
            match spec.category {
                ComboCategory::Healing if spec.bonus_damage >= 0.0 => {
                    return Err(invalid("healing combo needs a negative bonus damage"));
                }
                ComboCategory::Offensive if spec.bonus_damage < 0.0 => {
                    return Err(invalid("offensive combo cannot heal"));
                }
                _ => {}
            }
            if let Some(existing) = book.by_sequence.get(&spec.sequence) {
                return Err(ConfigError::DuplicateSequence {
                    first: book.combos[existing.0].key.clone(),
                    second: spec.key.clone(),
                });
            }

            let id = ComboId(book.combos.len());
            book.by_sequence.insert(spec.sequence.clone(), id);
            book.combos.push(ComboDefinition {
                id,
                key: spec.key.clone(),
                name: spec.name.clone(),
                sequence: spec.sequence.clone(),
                bonus_damage: spec.bonus_damage,
                stamina_cost: spec.stamina_cost,
                cooldown: spec.cooldown(),
                knockback: spec.knockback,
                category: spec.category,
                requires_airborne: spec.requires_airborne,
                color: spec.color.clone(),
            });
        }

        Ok(book)
    }

    /// Точное совпадение всей последовательности
    pub fn lookup(&self, sequence: &[ComboAction]) -> Option<ComboId> {
        self.by_sequence.get(sequence).copied()
    }

    pub fn get(&self, id: ComboId) -> Option<&ComboDefinition> {
        self.combos.get(id.0)
    }

    pub fn find(&self, key: &str) -> Option<&ComboDefinition> {
        self.combos.iter().find(|combo| combo.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComboDefinition> {
        self.combos.iter()
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }
}

/// Combo-состояние одного бойца
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ComboMatcher {
    history: Vec<ComboAction>,
    last_input_at: Option<Duration>,
    /// Время готовности по `ComboId` (None = не использовалось)
    cooldowns: Vec<Option<Duration>>,
    pending: Option<ComboId>,
}

impl ComboMatcher {
    pub fn new(book: &ComboBook) -> Self {
        Self {
            history: Vec::with_capacity(COMBO_HISTORY_LIMIT + 1),
            last_input_at: None,
            cooldowns: vec![None; book.len()],
            pending: None,
        }
    }

    pub fn history(&self) -> &[ComboAction] {
        &self.history
    }

    pub fn pending(&self) -> Option<ComboId> {
        self.pending
    }

    /// Добавляет действие в историю
    ///
    /// Пауза длиннее `window` с прошлого ввода сбрасывает историю до добавления.
    pub fn record_action(&mut self, action: ComboAction, now: Duration, window: Duration) {
        if let Some(last) = self.last_input_at {
            if now.saturating_sub(last) > window {
                self.history.clear();
            }
        }

        self.history.push(action);
        if self.history.len() > COMBO_HISTORY_LIMIT {
            let excess = self.history.len() - COMBO_HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        self.last_input_at = Some(now);
    }

    pub fn is_on_cooldown(&self, id: ComboId, now: Duration) -> bool {
        matches!(self.cooldowns.get(id.0), Some(Some(ready_at)) if now < *ready_at)
    }

    pub fn cooldown_remaining(&self, id: ComboId, now: Duration) -> Duration {
        match self.cooldowns.get(id.0) {
            Some(Some(ready_at)) => ready_at.saturating_sub(now),
            _ => Duration::ZERO,
        }
    }

    /// Ищет комбо, которое текущая история может вызвать прямо сейчас
    ///
    /// Ничего не мутирует: списание и cooldown делает `commit` по решению вызывающего.
    pub fn try_trigger(&self, book: &ComboBook, now: Duration, stamina: &Stamina, airborne: bool) -> Option<ComboId> {
        let id = book.lookup(&self.history)?;
        let combo = book.get(id)?;

        if self.is_on_cooldown(id, now) {
            return None;
        }
        if !stamina.has_at_least(combo.stamina_cost) {
            return None;
        }
        if combo.requires_airborne && !airborne {
            return None;
        }
        Some(id)
    }

    /// Запускает cooldown и очищает историю
    pub fn commit(&mut self, combo: &ComboDefinition, now: Duration) {
        let slot = combo.id.0;
        if slot >= self.cooldowns.len() {
            self.cooldowns.resize(slot + 1, None);
        }
        self.cooldowns[slot] = Some(now + combo.cooldown);
        self.history.clear();
    }

    pub fn arm(&mut self, id: ComboId) {
        self.pending = Some(id);
    }

    /// Забирает pending комбо (при попадании вызвавшей атаки)
    pub fn take_pending(&mut self) -> Option<ComboId> {
        self.pending.take()
    }

    /// Сгорание pending комбо: атака закончилась без попадания
    pub fn forfeit(&mut self) -> Option<ComboId> {
        self.pending.take()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_input_at = None;
        self.cooldowns.iter_mut().for_each(|slot| *slot = None);
        self.pending = None;
    }
}
