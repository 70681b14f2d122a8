//! Hit-test геометрия: тело бойца и зона удара
//!
//! Зона удара существует только пока боец в состоянии атаки.
//! Сравнения строгие: касание краями не считается попаданием.

use bevy::math::{Rect, Vec2};

use crate::components::{Body, Facing};
use crate::config::AttacksConfig;

/// Зона удара перед бойцом
///
/// Ширина = `range` от края тела по направлению взгляда,
/// по вертикали тело без `vertical_inset` сверху и снизу.
pub fn attack_zone(body: &Body, facing: Facing, attacks: &AttacksConfig) -> Rect {
    let x = match facing {
        Facing::Right => body.right(),
        Facing::Left => body.left() - attacks.range,
    };
    let top = body.position.y + attacks.vertical_inset;
    let bottom = body.position.y + body.size.y - attacks.vertical_inset;

    Rect {
        min: Vec2::new(x, top),
        max: Vec2::new(x + attacks.range, bottom.max(top)),
    }
}

/// Строгое пересечение прямоугольников (AABB)
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Перекрытие тел по x (0.0 если тела не пересекаются)
pub fn horizontal_overlap(a: &Body, b: &Body) -> f32 {
    if !overlaps(&a.rect(), &b.rect()) {
        return 0.0;
    }
    a.right().min(b.right()) - a.left().max(b.left())
}
