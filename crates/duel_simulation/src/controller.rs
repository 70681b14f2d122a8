//! Match controller: единственная точка входа в симуляцию
//!
//! Внешний цикл (окно, тесты, headless runner) вызывает `tick(dt, inputs)`
//! раз в кадр. Контроллер никогда не планирует себя сам.

use bevy::prelude::*;
use std::time::Duration;

use crate::combat::{
    AttackStarted, ComboBook, ComboForfeited, ComboLanded, ComboMatcher, ComboTriggered, DamageDealt, FighterDefeated,
    FighterState, Stamina,
};
use crate::components::{Body, Fighter, FighterBundle, FighterId, FighterInput, Health};
use crate::config::{ConfigError, DuelConfig};
use crate::effects::{EffectArena, EffectEvent};
use crate::logger;
use crate::match_state::{MatchClock, MatchOutcome, MatchPhase, MatchState, RoundEnded};
use crate::snapshot::FighterSnapshot;
use crate::{create_headless_app, CombatTick, SimulationPlugin};

/// Всё, что произошло за один тик
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub now: Duration,
    pub attacks: Vec<AttackStarted>,
    pub combos: Vec<ComboTriggered>,
    pub combos_landed: Vec<ComboLanded>,
    pub forfeits: Vec<ComboForfeited>,
    pub hits: Vec<DamageDealt>,
    pub defeats: Vec<FighterDefeated>,
    pub effects: Vec<EffectEvent>,
    pub round_ended: Option<MatchOutcome>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
            && self.combos.is_empty()
            && self.combos_landed.is_empty()
            && self.forfeits.is_empty()
            && self.hits.is_empty()
            && self.defeats.is_empty()
            && self.effects.is_empty()
            && self.round_ended.is_none()
    }
}

/// Поединок двух бойцов поверх headless Bevy App
pub struct DuelMatch {
    app: App,
    fighters: [Entity; 2],
}

impl DuelMatch {
    pub fn new(config: DuelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let book = ComboBook::from_specs(&config.combos)?;

        let mut app = create_headless_app();
        app.insert_resource(EffectArena::new(config.effects.slots))
            .insert_resource(book.clone())
            .insert_resource(config.clone())
            .add_plugins(SimulationPlugin);

        let world = app.world_mut();
        let fighters = FighterId::ALL.map(|id| world.spawn(FighterBundle::spawn(id, &config, &book)).id());

        logger::log_info(&format!(
            "Duel created: arena {}x{}, {} combos",
            config.arena.width,
            config.arena.height,
            book.len()
        ));

        Ok(Self { app, fighters })
    }

    /// Один тик симуляции
    ///
    /// Вне фазы Playing ничего не меняет и возвращает пустой отчёт.
    pub fn tick(&mut self, dt: Duration, inputs: [FighterInput; 2]) -> TickReport {
        if self.phase() != MatchPhase::Playing {
            return TickReport::default();
        }

        let world = self.app.world_mut();
        world.resource_mut::<MatchClock>().advance(dt);
        for (entity, input) in self.fighters.iter().zip(inputs) {
            if let Some(mut slot) = world.get_mut::<FighterInput>(*entity) {
                *slot = input;
            }
        }

        world.run_schedule(CombatTick);
        self.collect_report()
    }

    fn collect_report(&mut self) -> TickReport {
        let world = self.app.world_mut();
        let clock = *world.resource::<MatchClock>();

        let mut report = TickReport {
            tick: clock.tick(),
            now: clock.now(),
            attacks: drain_events(world),
            combos: drain_events(world),
            combos_landed: drain_events(world),
            forfeits: drain_events(world),
            hits: drain_events(world),
            defeats: drain_events(world),
            effects: drain_events(world),
            round_ended: None,
        };
        report.round_ended = drain_events::<RoundEnded>(world)
            .last()
            .map(|event| event.outcome);

        let mut arena = world.resource_mut::<EffectArena>();
        for effect in &report.effects {
            arena.push(effect.clone(), clock.now());
        }

        report
    }

    pub fn pause(&mut self) {
        let mut state = self.app.world_mut().resource_mut::<MatchState>();
        if state.phase == MatchPhase::Playing {
            state.phase = MatchPhase::Paused;
            logger::log("Match paused");
        }
    }

    pub fn resume(&mut self) {
        let mut state = self.app.world_mut().resource_mut::<MatchState>();
        if state.phase == MatchPhase::Paused {
            state.phase = MatchPhase::Playing;
            logger::log("Match resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase() {
            MatchPhase::Playing => self.pause(),
            MatchPhase::Paused => self.resume(),
            MatchPhase::Ended => {}
        }
    }

    /// Rematch: бойцы, часы, эффекты и события в начальное состояние
    pub fn restart(&mut self) {
        let config = self.config().clone();
        let book = self.combo_book().clone();
        let world = self.app.world_mut();

        for (id, entity) in FighterId::ALL.into_iter().zip(self.fighters) {
            world.entity_mut(entity).insert(FighterBundle::spawn(id, &config, &book));
        }

        world.resource_mut::<MatchClock>().reset();
        *world.resource_mut::<MatchState>() = MatchState::default();
        world.resource_mut::<EffectArena>().clear();

        clear_events::<AttackStarted>(world);
        clear_events::<ComboTriggered>(world);
        clear_events::<ComboLanded>(world);
        clear_events::<ComboForfeited>(world);
        clear_events::<DamageDealt>(world);
        clear_events::<FighterDefeated>(world);
        clear_events::<EffectEvent>(world);
        clear_events::<RoundEnded>(world);

        logger::log_info("Match restarted");
    }

    pub fn phase(&self) -> MatchPhase {
        self.app.world().resource::<MatchState>().phase
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.app.world().resource::<MatchState>().outcome
    }

    pub fn winner(&self) -> Option<FighterId> {
        self.outcome().and_then(|outcome| outcome.winner())
    }

    pub fn now(&self) -> Duration {
        self.app.world().resource::<MatchClock>().now()
    }

    pub fn tick_count(&self) -> u64 {
        self.app.world().resource::<MatchClock>().tick()
    }

    pub fn config(&self) -> &DuelConfig {
        self.app.world().resource::<DuelConfig>()
    }

    pub fn combo_book(&self) -> &ComboBook {
        self.app.world().resource::<ComboBook>()
    }

    pub fn fighter_entity(&self, id: FighterId) -> Entity {
        self.fighters[id.index()]
    }

    pub fn snapshot(&self, id: FighterId) -> Option<FighterSnapshot> {
        let world = self.app.world();
        let entity = world.get_entity(self.fighter_entity(id)).ok()?;

        Some(FighterSnapshot::capture(
            entity.get::<Fighter>()?,
            entity.get::<Body>()?,
            entity.get::<Health>()?,
            entity.get::<Stamina>()?,
            entity.get::<FighterState>()?,
            entity.get::<ComboMatcher>()?,
            self.combo_book(),
            self.now(),
        ))
    }

    /// Снапшот по номеру игрока (1 или 2)
    pub fn snapshot_by_number(&self, number: u8) -> Option<FighterSnapshot> {
        FighterId::from_number(number).and_then(|id| self.snapshot(id))
    }

    pub fn snapshots(&self) -> Vec<FighterSnapshot> {
        FighterId::ALL.into_iter().filter_map(|id| self.snapshot(id)).collect()
    }

    pub fn active_effects(&self) -> Vec<EffectEvent> {
        let now = self.now();
        self.app
            .world()
            .resource::<EffectArena>()
            .active(now)
            .cloned()
            .collect()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    /// Прямой доступ к миру (debug, тесты)
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}

fn drain_events<E: Event>(world: &mut World) -> Vec<E> {
    world
        .get_resource_mut::<Events<E>>()
        .map(|mut events| events.drain().collect())
        .unwrap_or_default()
}

fn clear_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.clear();
    }
}
