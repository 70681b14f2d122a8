//! Physics module: kinematic движение бойцов по арене

pub mod movement;

pub use movement::{apply_gravity, clamp_to_arena, integrate_body, is_inside_arena, resolve_ground_contact};
