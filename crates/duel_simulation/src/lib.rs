//! Duel Simulation Core
//!
//! Детерминированная ECS-симуляция поединка двух бойцов на Bevy 0.16:
//! движение, атаки, комбо, stamina economy, урон, knockback, конец раунда.
//!
//! Рендер, звук и захват ввода вне ядра. Наружу: `DuelMatch::tick`,
//! снапшоты бойцов и события эффектов.

use bevy::ecs::schedule::{ExecutorKind, ScheduleLabel};
use bevy::prelude::*;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod controller;
pub mod effects;
pub mod input_source;
pub mod logger;
pub mod match_state;
pub mod physics;
pub mod snapshot;

// Re-export базовых типов для удобства
pub use combat::{
    AttackKind, CombatPlugin, ComboAction, ComboBook, ComboCategory, ComboId, ComboMatcher, DamageDealt,
    FighterDefeated, FighterState, RecoveryMode, Stamina,
};
pub use components::*;
pub use config::{ConfigError, DuelConfig};
pub use controller::{DuelMatch, TickReport};
pub use effects::{EffectArena, EffectEvent, EffectKind};
pub use input_source::RandomInputSource;
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use match_state::{MatchClock, MatchOutcome, MatchPhase, MatchPlugin, MatchState, RoundEnded};
pub use snapshot::{CooldownView, FighterSnapshot};

/// Schedule одного тика боя (запускается контроллером вручную)
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombatTick;

/// Фазы тика: бойцы → разрешение ударов → конец раунда
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TickSet {
    Fighters,
    Resolve,
    RoundEnd,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Один поток и явный порядок: A → B → resolve → round end
        app.edit_schedule(CombatTick, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        });
        app.configure_sets(
            CombatTick,
            (TickSet::Fighters, TickSet::Resolve, TickSet::RoundEnd).chain(),
        );

        app.init_resource::<DuelConfig>()
            .init_resource::<EffectArena>()
            .add_plugins((CombatPlugin, MatchPlugin));

        if !app.world().contains_resource::<ComboBook>() {
            let book = ComboBook::from_specs(&app.world().resource::<DuelConfig>().combos).unwrap_or_else(|err| {
                logger::log_error(&format!("Invalid combo table, combos disabled: {}", err));
                ComboBook::default()
            });
            app.insert_resource(book);
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins);

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Компоненты сортируются по `FighterId`, сериализуются через Debug.
pub fn world_snapshot<T: Component + std::fmt::Debug>(world: &mut World) -> Vec<u8> {
    let mut snapshot = Vec::new();

    let mut query = world.query::<(&Fighter, &T)>();
    let mut rows: Vec<_> = query.iter(world).collect();
    rows.sort_by_key(|(fighter, _)| fighter.id);

    for (fighter, component) in rows {
        snapshot.push(fighter.id.number());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
