use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hecs::World;
use serde::Serialize;

use crate::components::{ActorFsm, Enemy, EnemyKind, Health, Player, Position};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to create recording {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write recording")]
    Write(#[from] std::io::Error),

    #[error("failed to encode snapshot")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Player,
    Brawler,
    Bomber,
}

impl From<EnemyKind> for ActorKind {
    fn from(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Brawler => ActorKind::Brawler,
            EnemyKind::Bomber => ActorKind::Bomber,
        }
    }
}

/// One actor at the end of one tick. Written as a single JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct ActorSnapshot {
    pub tick: u64,
    pub time: f32,
    pub entity: u32,
    pub kind: ActorKind,
    pub state: &'static str,
    pub position: [f32; 2],
    pub health: i32,
}

/// Collect a snapshot of every actor, player first, ordered by entity id.
pub fn snapshot(world: &World, tick: u64, time: f32) -> Vec<ActorSnapshot> {
    let mut actors: Vec<ActorSnapshot> = world
        .query::<(&Position, &ActorFsm, &Health, Option<&Player>, Option<&Enemy>)>()
        .iter()
        .filter_map(|(entity, (pos, fsm, health, player, enemy))| {
            let kind = match (player, enemy) {
                (Some(_), _) => ActorKind::Player,
                (None, Some(enemy)) => enemy.0.into(),
                (None, None) => return None,
            };
            Some(ActorSnapshot {
                tick,
                time,
                entity: entity.id(),
                kind,
                state: fsm.state.label(),
                position: pos.0.to_array(),
                health: health.current,
            })
        })
        .collect();
    actors.sort_by_key(|a| (a.kind != ActorKind::Player, a.entity));
    actors
}

/// Streams per-tick actor snapshots as JSON lines.
pub struct Recorder<W: Write> {
    out: W,
    lines: u64,
}

impl Recorder<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, RecordError> {
        let file = File::create(path).map_err(|source| RecordError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Recorder<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn record(&mut self, world: &World, tick: u64, time: f32) -> Result<(), RecordError> {
        for actor in snapshot(world, tick, time) {
            serde_json::to_writer(&mut self.out, &actor)?;
            self.out.write_all(b"\n")?;
            self.lines += 1;
        }
        Ok(())
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, RecordError> {
        self.out.flush()?;
        Ok(self.out)
    }
}
