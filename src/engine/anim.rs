use std::collections::HashMap;

/// Write-only sink for animation-graph parameters. The simulation never reads
/// animation state back; timing lives in the state machine.
pub trait AnimationSink {
    fn set_bool(&mut self, name: &'static str, value: bool);
    fn set_float(&mut self, name: &'static str, value: f32);
    fn set_trigger(&mut self, name: &'static str);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimParam {
    Bool(bool),
    Float(f32),
}

/// Component that records the parameters written each tick, standing in for
/// an engine animator. Triggers only live for the tick they were fired in.
#[derive(Debug, Default)]
pub struct Animator {
    params: HashMap<&'static str, AnimParam>,
    triggers: Vec<&'static str>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.params.get(name) {
            Some(AnimParam::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.params.get(name) {
            Some(AnimParam::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn triggered(&self, name: &str) -> bool {
        self.triggers.iter().any(|t| *t == name)
    }

    pub fn triggers(&self) -> &[&'static str] {
        &self.triggers
    }

    /// Forget last tick's triggers. Called once at the start of every tick.
    pub fn begin_tick(&mut self) {
        self.triggers.clear();
    }
}

impl AnimationSink for Animator {
    fn set_bool(&mut self, name: &'static str, value: bool) {
        self.params.insert(name, AnimParam::Bool(value));
    }

    fn set_float(&mut self, name: &'static str, value: f32) {
        self.params.insert(name, AnimParam::Float(value));
    }

    fn set_trigger(&mut self, name: &'static str) {
        self.triggers.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_last_one_tick() {
        let mut anim = Animator::new();
        anim.set_trigger("shoot");
        anim.set_bool("isWalking", true);
        assert!(anim.triggered("shoot"));
        anim.begin_tick();
        assert!(!anim.triggered("shoot"));
        assert_eq!(anim.bool("isWalking"), Some(true));
    }

    #[test]
    fn typed_getters_reject_other_kinds() {
        let mut anim = Animator::new();
        anim.set_float("fallSpeed", -3.0);
        assert_eq!(anim.bool("fallSpeed"), None);
        assert_eq!(anim.float("fallSpeed"), Some(-3.0));
    }
}
