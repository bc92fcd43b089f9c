use hecs::World;

use crate::components::{ActorFsm, ActorState, Animator, Velocity};
use crate::engine::anim::AnimationSink;

/// Horizontal speed below which a walker counts as standing.
const WALK_THRESHOLD: f32 = 0.01;

/// Write the state-derived animation parameters for one actor.
///
/// Parameters are pushed every tick; one-shot triggers (`attack1`, `shoot`,
/// `takeDamage`, ...) are fired by the systems that cause them.
pub fn write_params(sink: &mut impl AnimationSink, state: &ActorState, velocity: glam::Vec2) {
    let walking = velocity.x.abs() > WALK_THRESHOLD;

    sink.set_bool(
        "isWalking",
        walking && matches!(state, ActorState::Patrolling | ActorState::Moving),
    );
    sink.set_bool(
        "isMoving",
        walking && !matches!(state, ActorState::Dead | ActorState::Hanging),
    );
    sink.set_bool("isJumping", matches!(state, ActorState::Jumping));
    sink.set_bool("isFalling", matches!(state, ActorState::Falling));
    sink.set_bool("isCrouching", matches!(state, ActorState::Crouching));
    sink.set_bool("isRolling", matches!(state, ActorState::Rolling { .. }));
    sink.set_bool("isHanging", matches!(state, ActorState::Hanging));
    sink.set_bool("isClimbing", matches!(state, ActorState::Climbing { .. }));
    sink.set_bool("isDead", matches!(state, ActorState::Dead));
    sink.set_float("fallSpeed", velocity.y);
}

/// Forget last tick's triggers. First thing in every tick.
pub fn begin_animation_tick(world: &mut World) {
    for (_e, anim) in world.query_mut::<&mut Animator>() {
        anim.begin_tick();
    }
}

/// Reads `ActorFsm` + `Velocity`, writes `Animator` parameters. Runs after
/// every system that can change state or velocity.
pub fn animation_system(world: &mut World) {
    for (_e, (fsm, vel, anim)) in world.query_mut::<(&ActorFsm, &Velocity, &mut Animator)>() {
        write_params(anim, &fsm.state, vel.0);
    }
}
