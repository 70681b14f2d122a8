//! Combat resolver: взаимодействие двух бойцов за тик
//!
//! 1. Захват ударов и hit-guard обоих бойцов ДО любых мутаций
//! 2. A → B, затем B → A (обмен ударами в одном тике возможен)
//! 3. Разведение пересекающихся тел
//!
//! Система ожидает ровно двух бойцов; иначе warning и пропуск тика.

use bevy::math::Rect;
use bevy::prelude::*;

use super::combo::{ComboBook, ComboId, ComboMatcher};
use super::damage::{apply_damage, DamageDealt, FighterDefeated, Strike};
use super::fighter::attack_spec;
use super::hitbox::{attack_zone, horizontal_overlap, overlaps};
use super::state::{AttackKind, FighterState};
use crate::components::{Body, Fighter, FighterId, Health};
use crate::config::DuelConfig;
use crate::effects::EffectEvent;
use crate::logger;
use crate::match_state::MatchClock;
use crate::physics::clamp_to_arena;

/// Событие: атакующее комбо попало и применило бонус
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ComboLanded {
    pub attacker: FighterId,
    pub target: FighterId,
    pub combo: ComboId,
    pub bonus_damage: f32,
}

/// Снимок удара бойца на начало разрешения
#[derive(Debug, Clone, Copy)]
struct CapturedStrike {
    kind: AttackKind,
    zone: Rect,
    attacker_x: f32,
    pending: Option<ComboId>,
}

fn capture_strike(fighter: &Fighter, body: &Body, state: &FighterState, combo: &ComboMatcher, config: &DuelConfig) -> Option<CapturedStrike> {
    let kind = state.attack_kind()?;
    Some(CapturedStrike {
        kind,
        zone: attack_zone(body, fighter.facing, &config.attacks),
        attacker_x: body.position.x,
        pending: combo.pending(),
    })
}

/// System: hit detection и применение урона
pub fn resolve_strikes(
    clock: Res<MatchClock>,
    config: Res<DuelConfig>,
    book: Res<ComboBook>,
    mut fighters: Query<(&Fighter, &mut Body, &mut Health, &mut FighterState, &mut ComboMatcher)>,
    mut damage_events: EventWriter<DamageDealt>,
    mut defeated_events: EventWriter<FighterDefeated>,
    mut landed_events: EventWriter<ComboLanded>,
    mut effect_events: EventWriter<EffectEvent>,
) {
    let now = clock.now();
    let mut rows: Vec<_> = fighters.iter_mut().collect();
    if rows.len() != 2 {
        logger::log_warning(&format!("resolve_strikes: expected 2 fighters, found {}", rows.len()));
        return;
    }
    rows.sort_by_key(|row| row.0.id);

    // Снимки до мутаций: удар B учитывается, даже если A попал первым
    let strikes: Vec<Option<CapturedStrike>> = rows
        .iter()
        .map(|(fighter, body, _, state, combo)| capture_strike(fighter, body, state, combo, &config))
        .collect();
    let guards: Vec<bool> = rows.iter().map(|row| row.3.is_hit()).collect();

    for (attacker, target) in [(0usize, 1usize), (1, 0)] {
        let Some(strike) = strikes[attacker] else {
            continue;
        };
        if guards[target] {
            continue;
        }

        let (attacker_row, target_row) = pair_mut(&mut rows, attacker);
        let (attacker_fighter, attacker_body, _, _, attacker_combo) = attacker_row;
        let (target_fighter, target_body, target_health, target_state, _) = target_row;

        if !overlaps(&strike.zone, &target_body.rect()) {
            continue;
        }

        let base = attack_spec(&config, strike.kind);
        let mut hit = Strike {
            damage: base.damage,
            knockback: base.knockback,
            attacker_x: strike.attacker_x,
        };

        let attacker_id = attacker_fighter.id;
        let target_id = target_fighter.id;

        let redeemed = strike
            .pending
            .and_then(|_| attacker_combo.take_pending())
            .and_then(|combo_id| book.get(combo_id));
        if let Some(combo) = redeemed {
            hit.damage += combo.bonus_damage;
            hit.knockback = combo.knockback;
            logger::log_info(&format!(
                "Fighter {} landed {} ({}): {:.1} base + {:.1} bonus",
                attacker_id.number(),
                combo.key,
                combo.name,
                base.damage,
                combo.bonus_damage
            ));
            effect_events.write(EffectEvent::combo(attacker_id, attacker_body, combo, now, &config.effects));
            landed_events.write(ComboLanded {
                attacker: attacker_id,
                target: target_id,
                combo: combo.id,
                bonus_damage: combo.bonus_damage,
            });
        }

        let outcome = apply_damage(target_health, target_body, target_state, &hit, now, &config);

        logger::log_info(&format!(
            "Fighter {} hit fighter {} with {}: {:.1} damage{}, health {:.1}",
            attacker_id.number(),
            target_id.number(),
            strike.kind.as_str(),
            outcome.damage,
            if outcome.defended { " (defended)" } else { "" },
            target_health.current
        ));

        effect_events.write(EffectEvent::hit(target_id, target_body, outcome.damage, now, &config.effects));
        damage_events.write(DamageDealt {
            attacker: attacker_id,
            target: target_id,
            damage: outcome.damage,
            defended: outcome.defended,
            knockback: outcome.knockback,
            target_defeated: outcome.defeated,
        });

        if outcome.defeated {
            logger::log_info(&format!(
                "Fighter {} defeated by fighter {}",
                target_id.number(),
                attacker_id.number()
            ));
            defeated_events.write(FighterDefeated {
                fighter: target_id,
                by: attacker_id,
            });
        }
    }
}

/// Два элемента пары строк: (атакующий, цель)
fn pair_mut<T>(rows: &mut [T], attacker: usize) -> (&mut T, &mut T) {
    let (head, tail) = rows.split_at_mut(1);
    if attacker == 0 {
        (&mut head[0], &mut tail[0])
    } else {
        (&mut tail[0], &mut head[0])
    }
}

/// System: разведение пересекающихся тел по x
///
/// Каждый сдвигается на половину перекрытия (левый влево, правый вправо;
/// при равных x первый боец считается левым), затем clamp к арене.
pub fn separate_fighters(config: Res<DuelConfig>, mut fighters: Query<(&Fighter, &mut Body, &FighterState)>) {
    let mut rows: Vec<_> = fighters.iter_mut().collect();
    if rows.len() != 2 {
        return;
    }
    rows.sort_by_key(|row| row.0.id);

    let [first, second] = rows.as_mut_slice() else {
        return;
    };

    let overlap = horizontal_overlap(&first.1, &second.1);
    if overlap <= 0.0 {
        return;
    }

    let (left, right) = if first.1.position.x <= second.1.position.x {
        (first, second)
    } else {
        (second, first)
    };
    left.1.position.x -= overlap / 2.0;
    right.1.position.x += overlap / 2.0;

    clamp_to_arena(&mut left.1, left.2, &config.arena);
    clamp_to_arena(&mut right.1, right.2, &config.arena);
}
