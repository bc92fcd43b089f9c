/// States that can end a machine for good.
///
/// Once a machine has entered a state for which `is_terminal()` is `true`,
/// every later [`StateMachine::go`] / [`StateMachine::force_go`] is ignored.
pub trait Terminal {
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Minimal finite-state-machine container.
///
/// `S` is the state type (an enum whose timed variants carry their own
/// timers). The machine tracks the current state, the previous state, and how
/// long it has been in the current state. Transition rules live next to the
/// system that drives the machine (`impl ActorState` in `systems/`), not here.
///
/// # Usage
/// ```ignore
/// let mut fsm = StateMachine::new(ActorState::Idle);
/// // Each tick:
/// fsm.tick(dt);
/// if let Some(next) = fsm.state.next(&ctx) { fsm.go(next); }
/// ```
#[derive(Debug, Clone)]
pub struct StateMachine<S: Clone + Terminal> {
    pub state: S,
    pub previous: S,
    /// Seconds spent in the current state. Reset to 0.0 on each transition.
    pub elapsed: f32,
    entered_this_tick: bool,
}

impl<S: Clone + Terminal> StateMachine<S> {
    /// `just_entered()` returns `true` on the first tick.
    pub fn new(initial: S) -> Self {
        Self {
            previous: initial.clone(),
            state: initial,
            elapsed: 0.0,
            entered_this_tick: true,
        }
    }

    /// Transition to `next` only if it is a different variant from the
    /// current state (compared by discriminant). Returns `true` if the
    /// transition happened.
    pub fn go(&mut self, next: S) -> bool {
        if std::mem::discriminant(&self.state) == std::mem::discriminant(&next) {
            return false;
        }
        self.force_go(next)
    }

    /// Like [`go`](Self::go), but also transitions when the variant is the
    /// same (restarting a timed state with fresh data).
    pub fn force_go(&mut self, next: S) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.previous = std::mem::replace(&mut self.state, next);
        self.elapsed = 0.0;
        self.entered_this_tick = true;
        true
    }

    /// Advance the elapsed-in-state timer and clear the `just_entered` flag.
    /// Call once per tick **before** processing transitions so a transition
    /// fired this tick stays visible to downstream systems.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        self.entered_this_tick = false;
    }

    /// `true` only on the tick a transition fired.
    pub fn just_entered(&self) -> bool {
        self.entered_this_tick
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}
