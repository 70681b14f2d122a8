//! Fighter state machine: один тик одного бойца
//!
//! Порядок внутри тика:
//! 1. истечение таймеров (атака, hit), сгорание pending комбо
//! 2. ввод: движение → прыжок → защита → атака (пропускается в hit/defeated)
//! 3. physics step
//! 4. режим восстановления stamina (и авто-снятие защиты при истощении)
//!
//! `step_fighter`: чистая функция над компонентами, система `update_fighters`
//! только собирает строки запроса в фиксированном порядке бойцов.

use bevy::prelude::*;
use std::time::Duration;

use super::combo::{ComboAction, ComboBook, ComboCategory, ComboId, ComboMatcher};
use super::stamina::{RecoveryMode, Stamina, StaminaTick};
use super::state::{AttackKind, FighterState};
use crate::components::{Body, Facing, Fighter, FighterId, FighterInput, Health};
use crate::config::{AttackSpec, DuelConfig};
use crate::effects::EffectEvent;
use crate::logger;
use crate::match_state::MatchClock;
use crate::physics::integrate_body;

/// Событие: боец начал атаку
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AttackStarted {
    pub fighter: FighterId,
    pub kind: AttackKind,
    /// Комбо, взведённое этой атакой
    pub combo: Option<ComboId>,
}

/// Событие: комбо сработало по вводу
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ComboTriggered {
    pub fighter: FighterId,
    pub combo: ComboId,
    pub category: ComboCategory,
    /// Для лечащих комбо: фактически восстановленное здоровье
    pub healed: Option<f32>,
}

/// Событие: pending комбо сгорело (вызвавшая атака не попала)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ComboForfeited {
    pub fighter: FighterId,
    pub combo: ComboId,
}

/// Мутабельный вид на компоненты одного бойца
pub struct FighterMut<'a> {
    pub fighter: &'a mut Fighter,
    pub body: &'a mut Body,
    pub health: &'a mut Health,
    pub stamina: &'a mut Stamina,
    pub state: &'a mut FighterState,
    pub combo: &'a mut ComboMatcher,
}

pub struct StepContext<'a> {
    pub now: Duration,
    pub config: &'a DuelConfig,
    pub book: &'a ComboBook,
}

/// События, накопленные за шаг бойца
#[derive(Debug, Default)]
pub struct StepEvents {
    pub attacks: Vec<AttackStarted>,
    pub combos: Vec<ComboTriggered>,
    pub forfeits: Vec<ComboForfeited>,
    pub effects: Vec<EffectEvent>,
}

pub fn attack_spec(config: &DuelConfig, kind: AttackKind) -> &AttackSpec {
    match kind {
        AttackKind::Punch => &config.attacks.punch,
        AttackKind::Kick => &config.attacks.kick,
    }
}

/// Один тик бойца
pub fn step_fighter(fighter: &mut FighterMut, input: &FighterInput, ctx: &StepContext, events: &mut StepEvents) {
    let now = ctx.now;
    let config = ctx.config;

    expire_timers(fighter, now);

    if !fighter.state.is_attacking() {
        if let Some(combo) = fighter.combo.forfeit() {
            logger::log(&format!(
                "Fighter {} combo {} forfeited: attack did not land",
                fighter.fighter.id.number(),
                combo_key(ctx.book, combo)
            ));
            events.forfeits.push(ComboForfeited {
                fighter: fighter.fighter.id,
                combo,
            });
        }
    }

    if fighter.state.is_defeated() {
        fighter.body.velocity.x = 0.0;
        integrate_body(fighter.body, fighter.state, &config.arena, &config.fighter);
        fighter.stamina.advance(RecoveryMode::Suspended, now, &config.stamina);
        return;
    }

    let mut moved = false;
    if !fighter.state.is_hit() {
        moved = handle_movement(fighter, input, config);
        handle_jump(fighter, input, ctx);
        handle_defend(fighter, input);

        if let Some(kind) = input.requested_attack() {
            if !fighter.state.is_attacking() {
                try_start_attack(fighter, kind, ctx, events);
            }
        }
    }

    integrate_body(fighter.body, fighter.state, &config.arena, &config.fighter);

    let mode = recovery_mode(fighter.state, input, moved);
    let tick = fighter.stamina.advance(mode, now, &config.stamina);
    if tick == StaminaTick::Exhausted && fighter.state.is_defending() {
        *fighter.state = FighterState::at_rest(fighter.body.on_ground);
        logger::log(&format!(
            "Fighter {} guard broken: stamina exhausted",
            fighter.fighter.id.number()
        ));
    }
}

/// Истечение атаки или окна hit
fn expire_timers(fighter: &mut FighterMut, now: Duration) {
    if let Some(ends_at) = fighter.state.expires_at() {
        if now >= ends_at {
            *fighter.state = FighterState::at_rest(fighter.body.on_ground);
        }
    }
}

/// Горизонтальное движение; возвращает true, если направление принято
fn handle_movement(fighter: &mut FighterMut, input: &FighterInput, config: &DuelConfig) -> bool {
    let attacking = fighter.state.is_attacking();
    let direction = input.horizontal();

    if direction != 0.0 && !attacking {
        fighter.body.velocity.x = direction * config.fighter.speed;
        fighter.fighter.facing = if direction < 0.0 { Facing::Left } else { Facing::Right };
        if fighter.body.on_ground {
            *fighter.state = FighterState::Walking;
        }
        return true;
    }

    fighter.body.velocity.x *= config.fighter.friction;
    if fighter.body.on_ground && !attacking {
        *fighter.state = FighterState::Idle;
    }
    false
}

fn handle_jump(fighter: &mut FighterMut, input: &FighterInput, ctx: &StepContext) {
    if !input.jump || !fighter.body.on_ground || fighter.state.is_attacking() {
        return;
    }

    let config = ctx.config;
    fighter.body.velocity.y = -config.fighter.jump_power;
    fighter.body.on_ground = false;
    *fighter.state = FighterState::Jumping;
    fighter.stamina.refund(config.stamina.jump_bonus);
    fighter
        .combo
        .record_action(ComboAction::Jump, ctx.now, config.timings.combo_window());
}

fn handle_defend(fighter: &mut FighterMut, input: &FighterInput) {
    if input.defend && !fighter.state.is_attacking() && !fighter.stamina.is_empty() {
        *fighter.state = FighterState::Defending;
    } else if fighter.state.is_defending() {
        *fighter.state = FighterState::at_rest(fighter.body.on_ground);
    }
}

/// Попытка начать атаку (rate limit, stamina, комбо)
fn try_start_attack(fighter: &mut FighterMut, kind: AttackKind, ctx: &StepContext, events: &mut StepEvents) {
    let now = ctx.now;
    let config = ctx.config;
    let id = fighter.fighter.id;

    if let Some(last) = fighter.fighter.last_attack_at {
        if now.saturating_sub(last) < config.attacks.rate_limit() {
            return;
        }
    }

    let spec = attack_spec(config, kind);
    if !fighter.stamina.has_at_least(spec.stamina_cost) {
        return;
    }

    fighter.fighter.last_attack_at = Some(now);
    fighter
        .combo
        .record_action(ComboAction::from(kind), now, config.timings.combo_window());

    let airborne = !fighter.body.on_ground;
    let triggered = fighter
        .combo
        .try_trigger(ctx.book, now, fighter.stamina, airborne)
        .and_then(|combo_id| ctx.book.get(combo_id));

    let mut armed = None;
    if let Some(combo) = triggered {
        fighter.stamina.consume(combo.stamina_cost);
        fighter.combo.commit(combo, now);

        if combo.is_healing() {
            // Лечащее комбо заменяет атаку целиком
            let healed = fighter.health.heal(combo.heal_amount());
            logger::log_info(&format!(
                "Fighter {} triggered {} ({}): healed {:.1}",
                id.number(),
                combo.key,
                combo.name,
                healed
            ));
            events.effects.push(EffectEvent::combo(id, fighter.body, combo, now, &config.effects));
            events.effects.push(EffectEvent::heal(id, fighter.body, healed, now, &config.effects));
            events.combos.push(ComboTriggered {
                fighter: id,
                combo: combo.id,
                category: combo.category,
                healed: Some(healed),
            });
            return;
        }

        fighter.combo.arm(combo.id);
        armed = Some(combo.id);
        logger::log(&format!(
            "Fighter {} armed {} ({}) on {}",
            id.number(),
            combo.key,
            combo.name,
            kind.as_str()
        ));
        events.combos.push(ComboTriggered {
            fighter: id,
            combo: combo.id,
            category: combo.category,
            healed: None,
        });
    }

    fighter.stamina.consume(spec.stamina_cost);
    *fighter.state = FighterState::attacking(kind, now + spec.duration());

    events.effects.push(EffectEvent::attack(
        id,
        fighter.body,
        fighter.fighter.facing,
        kind,
        now,
        &config.effects,
    ));
    events.attacks.push(AttackStarted {
        fighter: id,
        kind,
        combo: armed,
    });
}

/// Режим восстановления stamina по итогам тика
pub fn recovery_mode(state: &FighterState, input: &FighterInput, moved: bool) -> RecoveryMode {
    if state.is_attacking() || state.is_hit() || state.is_defeated() {
        RecoveryMode::Suspended
    } else if state.is_defending() {
        RecoveryMode::Guarding
    } else if moved {
        RecoveryMode::Moving
    } else if *state == FighterState::Idle && input.is_idle() {
        RecoveryMode::Resting
    } else {
        RecoveryMode::Suspended
    }
}

fn combo_key(book: &ComboBook, combo: ComboId) -> &str {
    book.get(combo).map_or("<unknown>", |definition| definition.key.as_str())
}

/// System: шаг обоих бойцов в порядке FighterId
pub fn update_fighters(
    clock: Res<MatchClock>,
    config: Res<DuelConfig>,
    book: Res<ComboBook>,
    mut fighters: Query<(
        &mut Fighter,
        &mut Body,
        &mut Health,
        &mut Stamina,
        &mut FighterState,
        &mut ComboMatcher,
        &FighterInput,
    )>,
    mut attack_events: EventWriter<AttackStarted>,
    mut combo_events: EventWriter<ComboTriggered>,
    mut forfeit_events: EventWriter<ComboForfeited>,
    mut effect_events: EventWriter<EffectEvent>,
) {
    let ctx = StepContext {
        now: clock.now(),
        config: &config,
        book: &book,
    };
    let mut events = StepEvents::default();

    let mut rows: Vec<_> = fighters.iter_mut().collect();
    rows.sort_by_key(|row| row.0.id);

    for (mut fighter, mut body, mut health, mut stamina, mut state, mut combo, input) in rows {
        let mut view = FighterMut {
            fighter: &mut *fighter,
            body: &mut *body,
            health: &mut *health,
            stamina: &mut *stamina,
            state: &mut *state,
            combo: &mut *combo,
        };
        step_fighter(&mut view, input, &ctx, &mut events);
    }

    for event in events.attacks {
        attack_events.write(event);
    }
    for event in events.combos {
        combo_events.write(event);
    }
    for event in events.forfeits {
        forfeit_events.write(event);
    }
    for event in events.effects {
        effect_events.write(event);
    }
}
