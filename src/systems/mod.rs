pub mod ai;
mod animation;
pub mod collision;
pub mod combat;
pub mod health;
mod ledge;
mod lifecycle;
pub mod locomotion;
pub mod patrol;
mod physics;
mod player;
mod projectile;

pub use ai::enemy_system;
pub use animation::{animation_system, begin_animation_tick};
pub use combat::contact_damage_system;
pub use health::damage_system;
pub use lifecycle::{cooldown_system, despawn_system};
pub use physics::physics_step;
pub use player::{grounded_system, player_movement_system, player_state_system};
pub use projectile::projectile_system;
