mod character;
mod combat;
mod physics;

pub use character::*;
pub use combat::*;
pub use physics::*;

pub use crate::engine::anim::Animator;
