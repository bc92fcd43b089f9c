pub mod arena;
pub mod level;
pub mod prefabs;
