//! ECS компоненты бойца
//!
//! Боевые компоненты (Stamina, ComboMatcher, FighterState) живут в `combat`,
//! здесь только идентичность, тело, здоровье и ввод.

pub mod fighter;
pub mod input;

pub use fighter::*;
pub use input::*;
