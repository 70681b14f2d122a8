//! Состояние матча: часы, фаза, исход раунда
//!
//! `MatchClock` двигается только в фазе Playing, поэтому пауза
//! замораживает все таймеры (атаки, hit, cooldown, stamina).

use bevy::prelude::*;
use serde::Serialize;
use std::time::Duration;

use crate::components::{Fighter, FighterId, Health};
use crate::logger;
use crate::{CombatTick, TickSet};

/// Монотонное время матча
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchClock {
    now: Duration,
    tick: u64,
}

impl MatchClock {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
        self.tick += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    #[default]
    Playing,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchOutcome {
    Winner(FighterId),
    /// Оба бойца дошли до нуля в одном тике
    Draw,
}

impl MatchOutcome {
    pub fn winner(&self) -> Option<FighterId> {
        match self {
            MatchOutcome::Winner(id) => Some(*id),
            MatchOutcome::Draw => None,
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchState {
    pub phase: MatchPhase,
    pub outcome: Option<MatchOutcome>,
}

impl MatchState {
    pub fn is_playing(&self) -> bool {
        self.phase == MatchPhase::Playing
    }
}

/// Событие: раунд закончен
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEnded {
    pub outcome: MatchOutcome,
}

/// Исход по здоровью бойцов (None = бой продолжается)
pub fn evaluate_outcome(fighters: &[(FighterId, f32)]) -> Option<MatchOutcome> {
    let fallen: Vec<FighterId> = fighters
        .iter()
        .filter(|(_, health)| *health <= 0.0)
        .map(|(id, _)| *id)
        .collect();

    match fallen.as_slice() {
        [] => None,
        [loser] => Some(MatchOutcome::Winner(loser.opponent())),
        _ => Some(MatchOutcome::Draw),
    }
}

/// System: проверка конца раунда
pub fn check_round_end(
    mut state: ResMut<MatchState>,
    fighters: Query<(&Fighter, &Health)>,
    mut round_events: EventWriter<RoundEnded>,
) {
    if !state.is_playing() {
        return;
    }

    let healths: Vec<(FighterId, f32)> = fighters
        .iter()
        .map(|(fighter, health)| (fighter.id, health.current))
        .collect();

    let Some(outcome) = evaluate_outcome(&healths) else {
        return;
    };

    state.phase = MatchPhase::Ended;
    state.outcome = Some(outcome);

    match outcome {
        MatchOutcome::Winner(id) => logger::log_info(&format!("Round over: fighter {} wins", id.number())),
        MatchOutcome::Draw => logger::log_info("Round over: double knockout, draw"),
    }
    round_events.write(RoundEnded { outcome });
}

/// Match Plugin: фаза матча и проверка конца раунда
pub struct MatchPlugin;

impl Plugin for MatchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MatchClock>()
            .init_resource::<MatchState>()
            .add_event::<RoundEnded>()
            .add_systems(CombatTick, check_round_end.in_set(TickSet::RoundEnd));
    }
}
