//! Gameplay tuning, loaded from TOML and validated before a run.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;

use crate::components::{Delivery, Faction, LedgeSensor, ProjectileSpec, Weapon};

/// Tuning errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tuning file")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// All gameplay numbers. Every section and field falls back to its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub brawler: BrawlerTuning,
    pub bomber: BomberTuning,
    pub bullet: BulletTuning,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Downward acceleration in units/s² before per-actor gravity scale.
    pub gravity: f32,
    /// Seconds a dead actor stays in the world before removal.
    pub death_removal_delay: f32,
    /// Distance under which a patrol waypoint counts as reached.
    pub arrival_epsilon: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            death_removal_delay: 5.0,
            arrival_epsilon: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: i32,
    pub half_extents: Vec2,
    pub move_speed: f32,
    pub run_multiplier: f32,
    pub crouch_multiplier: f32,
    pub jump_force: f32,
    pub max_jumps: u32,
    pub normal_gravity: f32,
    pub falling_gravity: f32,
    pub roll_distance: f32,
    pub roll_duration: f32,
    pub roll_cooldown: f32,
    pub shoot_cooldown: f32,
    pub shoot_hold: f32,
    /// Bullet spawn point relative to the player centre, x mirrored by facing.
    pub fire_offset: Vec2,
    pub climb_offset: Vec2,
    pub climb_duration: f32,
    pub grip_offset: Vec2,
    pub grip_size: Vec2,
    pub clear_offset: Vec2,
    pub clear_size: Vec2,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            half_extents: Vec2::new(0.4, 0.9),
            move_speed: 10.0,
            run_multiplier: 1.5,
            crouch_multiplier: 0.4,
            jump_force: 8.0,
            max_jumps: 2,
            normal_gravity: 1.0,
            falling_gravity: 5.0,
            roll_distance: 4.0,
            roll_duration: 0.4,
            roll_cooldown: 0.8,
            shoot_cooldown: 0.2,
            shoot_hold: 0.15,
            fire_offset: Vec2::new(0.6, 0.2),
            climb_offset: Vec2::new(1.0, 2.0),
            climb_duration: 0.5,
            grip_offset: Vec2::new(0.55, 0.75),
            grip_size: Vec2::new(0.3, 0.3),
            clear_offset: Vec2::new(0.55, 1.35),
            clear_size: Vec2::new(0.3, 0.6),
        }
    }
}

impl PlayerTuning {
    pub fn ledge_sensor(&self) -> LedgeSensor {
        LedgeSensor {
            grip_offset: self.grip_offset,
            grip_size: self.grip_size,
            clear_offset: self.clear_offset,
            clear_size: self.clear_size,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrawlerTuning {
    pub max_health: i32,
    pub half_extents: Vec2,
    pub move_speed: f32,
    pub run_multiplier: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub damage: i32,
    /// Full length of one swing, and the delay before the next one.
    pub attack_cooldown: f32,
    /// Delay from the start of a swing to its hit check.
    pub attack_windup: f32,
    pub patrol_range: f32,
    pub min_patrol_distance: f32,
    pub patrol_wait: f32,
    pub contact_damage: i32,
    pub contact_cooldown: f32,
}

impl Default for BrawlerTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            half_extents: Vec2::new(0.5, 0.8),
            move_speed: 3.0,
            run_multiplier: 1.5,
            detection_range: 10.0,
            attack_range: 2.0,
            damage: 10,
            attack_cooldown: 2.0,
            attack_windup: 0.5,
            patrol_range: 5.0,
            min_patrol_distance: 1.5,
            patrol_wait: 2.0,
            contact_damage: 10,
            contact_cooldown: 1.0,
        }
    }
}

impl BrawlerTuning {
    pub fn weapon(&self) -> Weapon {
        Weapon {
            owner: Faction::Enemy,
            melee_range: self.attack_range,
            shoot_range: 0.0,
            cooldown: self.attack_cooldown,
            projectile: ProjectileSpec {
                speed: 0.0,
                damage: self.damage,
                time_to_live: 0.0,
                radius: 0.0,
                explosive: None,
            },
            delivery: Delivery::Straight,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BomberTuning {
    pub max_health: i32,
    pub half_extents: Vec2,
    pub patrol_speed: f32,
    pub detection_range: f32,
    pub shoot_cooldown: f32,
    pub shoot_hold: f32,
    pub grenade_speed: f32,
    pub arc_height: f32,
    pub grenade_damage: i32,
    pub explosion_radius: f32,
    pub grenade_radius: f32,
    pub grenade_lifetime: f32,
    pub fire_offset: Vec2,
    /// How far ahead of the body edge the ground sensor looks.
    pub look_ahead: f32,
    pub look_depth: f32,
}

impl Default for BomberTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            half_extents: Vec2::new(0.5, 0.6),
            patrol_speed: 2.0,
            detection_range: 8.0,
            shoot_cooldown: 2.0,
            shoot_hold: 0.3,
            grenade_speed: 5.0,
            arc_height: 2.0,
            grenade_damage: 20,
            explosion_radius: 1.5,
            grenade_radius: 0.15,
            grenade_lifetime: 10.0,
            fire_offset: Vec2::new(0.3, 0.5),
            look_ahead: 0.2,
            look_depth: 1.0,
        }
    }
}

impl BomberTuning {
    pub fn weapon(&self) -> Weapon {
        Weapon {
            owner: Faction::Enemy,
            melee_range: 0.0,
            shoot_range: self.detection_range,
            cooldown: self.shoot_cooldown,
            projectile: ProjectileSpec {
                speed: self.grenade_speed,
                damage: self.grenade_damage,
                time_to_live: self.grenade_lifetime,
                radius: self.grenade_radius,
                explosive: Some(self.explosion_radius),
            },
            delivery: Delivery::Arc {
                height: self.arc_height,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BulletTuning {
    pub speed: f32,
    pub damage: i32,
    pub lifetime: f32,
    pub radius: f32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            speed: 20.0,
            damage: 10,
            lifetime: 5.0,
            radius: 0.1,
        }
    }
}

impl Tuning {
    /// Player gun: fires along facing, so only the cooldown and projectile matter.
    pub fn player_weapon(&self) -> Weapon {
        Weapon {
            owner: Faction::Player,
            melee_range: 0.0,
            shoot_range: f32::INFINITY,
            cooldown: self.player.shoot_cooldown,
            projectile: ProjectileSpec {
                speed: self.bullet.speed,
                damage: self.bullet.damage,
                time_to_live: self.bullet.lifetime,
                radius: self.bullet.radius,
                explosive: None,
            },
            delivery: Delivery::Straight,
        }
    }

    /// Read, parse and validate a tuning file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let tuning: Self = toml::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("player.max_health", self.player.max_health as f32)?;
        positive("brawler.max_health", self.brawler.max_health as f32)?;
        positive("bomber.max_health", self.bomber.max_health as f32)?;
        non_negative("world.gravity", self.world.gravity)?;
        non_negative("world.death_removal_delay", self.world.death_removal_delay)?;
        positive("world.arrival_epsilon", self.world.arrival_epsilon)?;
        positive("player.roll_duration", self.player.roll_duration)?;
        positive("player.climb_duration", self.player.climb_duration)?;
        non_negative("player.shoot_cooldown", self.player.shoot_cooldown)?;
        non_negative("player.roll_cooldown", self.player.roll_cooldown)?;
        non_negative("brawler.patrol_range", self.brawler.patrol_range)?;
        non_negative("brawler.min_patrol_distance", self.brawler.min_patrol_distance)?;
        non_negative("brawler.attack_windup", self.brawler.attack_windup)?;
        positive("bomber.grenade_speed", self.bomber.grenade_speed)?;
        positive("bullet.speed", self.bullet.speed)?;

        if self.brawler.min_patrol_distance > self.brawler.patrol_range {
            return Err(ConfigError::Invalid {
                field: "brawler.min_patrol_distance",
                reason: format!(
                    "{} exceeds patrol_range {}; no waypoint could ever be chosen",
                    self.brawler.min_patrol_distance, self.brawler.patrol_range
                ),
            });
        }
        if self.brawler.attack_windup > self.brawler.attack_cooldown {
            return Err(ConfigError::Invalid {
                field: "brawler.attack_windup",
                reason: format!(
                    "{} is longer than attack_cooldown {}",
                    self.brawler.attack_windup, self.brawler.attack_cooldown
                ),
            });
        }
        if self.brawler.attack_range > self.brawler.detection_range {
            return Err(ConfigError::Invalid {
                field: "brawler.attack_range",
                reason: "must not exceed detection_range".to_string(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be positive"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must not be negative"),
        })
    }
}
