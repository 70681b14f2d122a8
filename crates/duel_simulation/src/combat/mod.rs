//! Combat system module
//!
//! Ответственность:
//! - Состояние бойца: FighterState, Stamina, ComboMatcher
//! - Правила боя: атаки, комбо, урон, knockback, защита
//! - Events: AttackStarted, ComboTriggered, ComboForfeited, ComboLanded, DamageDealt, FighterDefeated
//!
//! Рендер, звук и ввод вне ядра: наружу уходят события и снапшоты.

use bevy::prelude::*;

pub mod combo;
pub mod damage;
pub mod fighter;
pub mod hitbox;
pub mod resolver;
pub mod stamina;
pub mod state;


// Re-export основных типов
pub use combo::{ComboAction, ComboBook, ComboCategory, ComboDefinition, ComboId, ComboMatcher, COMBO_HISTORY_LIMIT};
pub use damage::{apply_damage, knockback_direction, DamageDealt, FighterDefeated, HitOutcome, Strike};
pub use fighter::{
    attack_spec, recovery_mode, step_fighter, update_fighters, AttackStarted, ComboForfeited, ComboTriggered,
    FighterMut, StepContext, StepEvents,
};
pub use hitbox::{attack_zone, horizontal_overlap, overlaps};
pub use resolver::{resolve_strikes, separate_fighters, ComboLanded};
pub use stamina::{RecoveryMode, Stamina, StaminaTick};
pub use state::{AttackKind, FighterState};

use crate::effects::EffectEvent;
use crate::{CombatTick, TickSet};

/// Combat Plugin
///
/// Регистрирует combat системы в `CombatTick`.
///
/// Порядок выполнения:
/// 1. update_fighters: ввод, таймеры, физика, stamina обоих бойцов (по FighterId)
/// 2. resolve_strikes: попадания A → B, затем B → A
/// 3. separate_fighters: разведение пересекающихся тел
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<AttackStarted>()
            .add_event::<ComboTriggered>()
            .add_event::<ComboForfeited>()
            .add_event::<ComboLanded>()
            .add_event::<DamageDealt>()
            .add_event::<FighterDefeated>()
            .add_event::<EffectEvent>();

        app.add_systems(CombatTick, update_fighters.in_set(TickSet::Fighters));
        app.add_systems(
            CombatTick,
            (resolve_strikes, separate_fighters).chain().in_set(TickSet::Resolve),
        );
    }
}
