use std::fmt;
use std::fs::File;
use std::io::BufWriter;

use hecs::{CommandBuffer, Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::components::{ActorFsm, ActorState, Enemy, EnemyKind, Health, Position};
use crate::config::Tuning;
use crate::engine::input::InputScript;
use crate::engine::time::{FixedStep, FIXED_DT};
use crate::recording::{RecordError, Recorder};
use crate::scene::arena::load_arena;
use crate::scene::level::Level;
use crate::systems::health::fraction;
use crate::systems::{
    animation_system, begin_animation_tick, contact_damage_system, cooldown_system,
    damage_system, despawn_system, enemy_system, grounded_system, physics_step,
    player_movement_system, player_state_system, projectile_system,
};

/// Headless simulation: the ECS world, its level, and the fixed-step clock.
pub struct Simulation {
    world: World,
    level: Level,
    tuning: Tuning,
    rng: ChaCha8Rng,
    player: Entity,
    script: InputScript,
    clock: FixedStep,
    tick: u64,
    time: f32,
    recorder: Option<Recorder<BufWriter<File>>>,
}

impl Simulation {
    /// Build the default arena with the given tuning and RNG seed.
    pub fn new(tuning: Tuning, seed: u64, script: InputScript) -> Self {
        let mut world = World::new();
        let (level, player) = load_arena(&mut world, &tuning);
        info!(seed, actors = world.len(), "arena loaded");
        Self {
            world,
            level,
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
            player,
            script,
            clock: FixedStep::new(),
            tick: 0,
            time: 0.0,
            recorder: None,
        }
    }

    pub fn with_recorder(mut self, recorder: Recorder<BufWriter<File>>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Feed a variable frame time; runs as many fixed ticks as are due.
    pub fn advance(&mut self, frame_dt: f32) -> Result<u32, RecordError> {
        let ticks = self.clock.advance(frame_dt);
        for _ in 0..ticks {
            self.step(FIXED_DT)?;
        }
        Ok(ticks)
    }

    /// Run every system once, in order. Drivers pass `FIXED_DT`.
    pub fn step(&mut self, dt: f32) -> Result<(), RecordError> {
        let input = self.script.sample(self.time, self.time + dt);
        let mut cmd = CommandBuffer::new();

        begin_animation_tick(&mut self.world);
        cooldown_system(&mut self.world, dt);

        player_state_system(&mut self.world, &input, &self.tuning, &self.level, &mut cmd, dt);
        player_movement_system(&mut self.world, &input, &self.tuning.player);

        let mut damage = enemy_system(
            &mut self.world,
            &self.tuning,
            &self.level,
            &mut self.rng,
            &mut cmd,
            dt,
        );

        let contacts = physics_step(&mut self.world, &self.level, self.tuning.world.gravity, dt);
        grounded_system(&mut self.world, &contacts);

        damage.extend(projectile_system(&mut self.world, &self.level, &mut cmd, dt));
        damage.extend(contact_damage_system(&mut self.world));
        damage_system(&mut self.world, &damage, self.tuning.world.death_removal_delay);

        despawn_system(&mut self.world, &mut cmd, dt);
        animation_system(&mut self.world);
        cmd.run_on(&mut self.world);

        self.tick += 1;
        self.time += dt;
        if !damage.is_empty() {
            debug!(tick = self.tick, hits = damage.len(), "damage resolved");
        }

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(&self.world, self.tick, self.time)?;
        }
        Ok(())
    }

    /// Run until `seconds` of simulated time have passed.
    pub fn run_for(&mut self, seconds: f32) -> Result<(), RecordError> {
        let ticks = (seconds.max(0.0) / FIXED_DT).round() as u64;
        for _ in 0..ticks {
            self.step(FIXED_DT)?;
        }
        Ok(())
    }

    /// Flush the recorder, if any. Returns the number of lines written.
    pub fn finish(&mut self) -> Result<Option<u64>, RecordError> {
        match self.recorder.take() {
            Some(recorder) => {
                let lines = recorder.lines();
                recorder.finish()?;
                Ok(Some(lines))
            }
            None => Ok(None),
        }
    }

    pub fn summary(&self) -> Summary {
        let player = self
            .world
            .query_one::<(&ActorFsm, &Health, &Position)>(self.player)
            .ok()
            .and_then(|mut q| q.get().map(|(fsm, health, pos)| ActorLine {
                label: "player".to_string(),
                state: fsm.state.label(),
                health: fraction(health),
                x: pos.0.x,
                y: pos.0.y,
            }));

        let mut enemies: Vec<(u32, ActorLine)> = self
            .world
            .query::<(&Enemy, &ActorFsm, &Health, &Position)>()
            .iter()
            .map(|(entity, (enemy, fsm, health, pos))| {
                let name = match enemy.0 {
                    EnemyKind::Brawler => "brawler",
                    EnemyKind::Bomber => "bomber",
                };
                (
                    entity.id(),
                    ActorLine {
                        label: format!("{name}#{}", entity.id()),
                        state: fsm.state.label(),
                        health: fraction(health),
                        x: pos.0.x,
                        y: pos.0.y,
                    },
                )
            })
            .collect();
        enemies.sort_by_key(|(id, _)| *id);

        let enemies_dead = self
            .world
            .query::<(&Enemy, &ActorFsm)>()
            .iter()
            .filter(|(_e, (_enemy, fsm))| fsm.state == ActorState::Dead)
            .count();

        Summary {
            ticks: self.tick,
            time: self.time,
            player,
            enemies: enemies.into_iter().map(|(_, line)| line).collect(),
            enemies_dead,
        }
    }
}

/// One actor's line in the end-of-run report.
#[derive(Debug, Clone)]
pub struct ActorLine {
    pub label: String,
    pub state: &'static str,
    /// Health as a share of max.
    pub health: f32,
    pub x: f32,
    pub y: f32,
}

/// End-of-run report printed by the binary.
#[derive(Debug, Clone)]
pub struct Summary {
    pub ticks: u64,
    pub time: f32,
    /// `None` once the player has been removed.
    pub player: Option<ActorLine>,
    /// Enemies still in the world, dead ones included until removed.
    pub enemies: Vec<ActorLine>,
    pub enemies_dead: usize,
}

impl fmt::Display for ActorLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:<11} hp {:>3.0}%  at ({:.2}, {:.2})",
            self.label,
            self.state,
            self.health * 100.0,
            self.x,
            self.y
        )
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ticks, {:.2}s simulated", self.ticks, self.time)?;
        match &self.player {
            Some(line) => writeln!(f, "  {line}")?,
            None => writeln!(f, "  player       removed")?,
        }
        for line in &self.enemies {
            writeln!(f, "  {line}")?;
        }
        write!(f, "  {} enemy(s) dead", self.enemies_dead)
    }
}

#[cfg(test)]
impl Simulation {
    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn player(&self) -> Entity {
        self.player
    }
}
