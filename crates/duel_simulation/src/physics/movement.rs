//! Kinematic физика бойца
//!
//! Своя интеграция скорости в пикселях за тик (не за секунду):
//! гравитация, контакт с землёй, границы арены.
//!
//! Детерминизм: только арифметика над f32 в фиксированном порядке.

use bevy::prelude::*;

use crate::combat::FighterState;
use crate::components::Body;
use crate::config::{ArenaConfig, FighterConfig};

/// Гравитация (только в воздухе)
pub fn apply_gravity(body: &mut Body, fighter: &FighterConfig) {
    if !body.on_ground {
        body.velocity.y += fighter.gravity;
    }
}

/// Контакт с линией земли
///
/// Приземление из прыжка переводит в Walking (есть vx) или Idle.
pub fn resolve_ground_contact(body: &mut Body, state: &mut FighterState, arena: &ArenaConfig) {
    let floor = arena.ground_y();

    if body.position.y + body.size.y >= floor {
        body.position.y = floor - body.size.y;
        body.velocity.y = 0.0;
        body.on_ground = true;

        if *state == FighterState::Jumping {
            *state = if body.velocity.x != 0.0 {
                FighterState::Walking
            } else {
                FighterState::Idle
            };
        }
    } else {
        body.on_ground = false;
    }
}

/// Горизонтальные стены и потолок
///
/// У стены vx обнуляется. Под потолком vy обнуляется, кроме окна hit:
/// отброшенный боец продолжает полёт и падает под гравитацией.
pub fn clamp_to_arena(body: &mut Body, state: &FighterState, arena: &ArenaConfig) {
    if body.position.x < 0.0 {
        body.position.x = 0.0;
        body.velocity.x = 0.0;
    }
    if body.position.x + body.size.x > arena.width {
        body.position.x = arena.width - body.size.x;
        body.velocity.x = 0.0;
    }

    if body.position.y < 0.0 {
        body.position.y = 0.0;
        if !state.is_hit() {
            body.velocity.y = 0.0;
        }
    }
}

/// Полный physics step одного бойца
pub fn integrate_body(body: &mut Body, state: &mut FighterState, arena: &ArenaConfig, fighter: &FighterConfig) {
    apply_gravity(body, fighter);
    body.position += body.velocity;
    resolve_ground_contact(body, state, arena);
    clamp_to_arena(body, state, arena);
}

/// Позиция внутри арены (для инвариантов в тестах и debug-проверок)
pub fn is_inside_arena(body: &Body, arena: &ArenaConfig) -> bool {
    let min = Vec2::ZERO;
    let max = Vec2::new(arena.width, arena.ground_y());
    body.position.x >= min.x
        && body.position.y >= min.y
        && body.position.x + body.size.x <= max.x
        && body.position.y + body.size.y <= max.y
}
