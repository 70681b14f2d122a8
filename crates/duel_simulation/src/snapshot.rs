//! Read-only снапшоты бойцов для UI/debug
//!
//! Снапшот полностью отвязан от ECS: его можно сериализовать,
//! сравнивать между прогонами и отдавать рендеру.

use serde::Serialize;
use std::time::Duration;

use crate::combat::{ComboAction, ComboBook, ComboMatcher, FighterState, RecoveryMode, Stamina};
use crate::components::{Body, Facing, Fighter, FighterId, Health};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CooldownView {
    pub key: String,
    pub name: String,
    /// Оставшееся время cooldown (0 = готово)
    pub remaining_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FighterSnapshot {
    pub id: FighterId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    pub on_ground: bool,
    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub recovery: RecoveryMode,
    pub state: &'static str,
    pub is_attacking: bool,
    pub is_defending: bool,
    pub is_hit: bool,
    pub is_defeated: bool,
    pub combo_history: Vec<ComboAction>,
    pub cooldowns: Vec<CooldownView>,
    pub pending_combo: Option<String>,
}

impl FighterSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn capture(
        fighter: &Fighter,
        body: &Body,
        health: &Health,
        stamina: &Stamina,
        state: &FighterState,
        combo: &ComboMatcher,
        book: &ComboBook,
        now: Duration,
    ) -> Self {
        let cooldowns = book
            .iter()
            .map(|definition| CooldownView {
                key: definition.key.clone(),
                name: definition.name.clone(),
                remaining_ms: combo.cooldown_remaining(definition.id, now).as_millis() as u64,
            })
            .collect();

        Self {
            id: fighter.id,
            x: body.position.x,
            y: body.position.y,
            vx: body.velocity.x,
            vy: body.velocity.y,
            facing: fighter.facing,
            on_ground: body.on_ground,
            health: health.current,
            max_health: health.max,
            stamina: stamina.current,
            max_stamina: stamina.max,
            recovery: stamina.recovery(),
            state: state.label(),
            is_attacking: state.is_attacking(),
            is_defending: state.is_defending(),
            is_hit: state.is_hit(),
            is_defeated: state.is_defeated(),
            combo_history: combo.history().to_vec(),
            cooldowns,
            pending_combo: combo
                .pending()
                .and_then(|id| book.get(id))
                .map(|definition| definition.name.clone()),
        }
    }

    pub fn cooldown(&self, key: &str) -> Option<&CooldownView> {
        self.cooldowns.iter().find(|view| view.key == key)
    }
}
