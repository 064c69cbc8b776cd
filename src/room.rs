//! Room driver: one tokio task per game.
//!
//! The task owns its `Game`. Commands arrive on an mpsc channel with a oneshot
//! for the reply, a periodic interval drives `Game::tick`, and drained events
//! fan out on a broadcast channel. The clock is the task's elapsed time, so
//! tests with paused tokio time are deterministic.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::time::{Instant, MissedTickBehavior};

use crate::engine::Game;
use crate::event::{GameEvent, Standing};
use crate::protocol::{dispatch, Command, Reply};

/// How often a room polls its deadlines.
pub const TICK_INTERVAL_MS: u64 = 100;

const REQUEST_QUEUE: usize = 64;
const EVENT_QUEUE: usize = 1024;

/// Receives final standings once per finished game.
pub trait ResultsSink: Send + Sync {
    fn record_results(&self, room: &str, standings: &[Standing]);
}

/// Writes standings to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogResultsSink;

impl ResultsSink for LogResultsSink {
    fn record_results(&self, room: &str, standings: &[Standing]) {
        for standing in standings {
            tracing::info!(
                room,
                rank = standing.rank,
                robot = %standing.robot,
                name = %standing.name,
                checkpoints = standing.checkpoints,
                "final standing"
            );
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room '{0}' already exists")]
    AlreadyExists(String),

    #[error("room '{0}' not found")]
    NotFound(String),

    #[error("room '{0}' has shut down")]
    Closed(String),
}

/// A command plus where to send its reply.
#[derive(Debug)]
pub struct RoomRequest {
    pub command: Command,
    pub reply: oneshot::Sender<Reply>,
}

/// Cloneable handle to a running room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: String,
    requests: mpsc::Sender<RoomRequest>,
    events: broadcast::Sender<GameEvent>,
}

impl RoomHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sends a command and waits for the room's reply.
    pub async fn send(&self, command: Command) -> Result<Reply, RoomError> {
        let (reply, answer) = oneshot::channel();
        self.requests
            .send(RoomRequest { command, reply })
            .await
            .map_err(|_| RoomError::Closed(self.id.clone()))?;
        answer.await.map_err(|_| RoomError::Closed(self.id.clone()))
    }

    /// Subscribes to events produced from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.requests.is_closed()
    }
}

/// Spawns the task driving `game`. Must be called inside a tokio runtime.
pub fn spawn_room(id: &str, game: Game, sink: Arc<dyn ResultsSink>) -> RoomHandle {
    let (requests, inbox) = mpsc::channel(REQUEST_QUEUE);
    let (events, _) = broadcast::channel(EVENT_QUEUE);
    let handle = RoomHandle {
        id: id.to_string(),
        requests,
        events: events.clone(),
    };
    tokio::spawn(run_room(id.to_string(), game, inbox, events, sink));
    handle
}

async fn run_room(
    id: String,
    mut game: Game,
    mut inbox: mpsc::Receiver<RoomRequest>,
    events: broadcast::Sender<GameEvent>,
    sink: Arc<dyn ResultsSink>,
) {
    let started = Instant::now();
    let now_ms = || started.elapsed().as_millis() as u64;
    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut reported = false;
    tracing::info!(room = %id, board = %game.board().name, "room opened");

    loop {
        tokio::select! {
            request = inbox.recv() => {
                let Some(RoomRequest { command, reply }) = request else {
                    break;
                };
                if command == Command::Quit {
                    let _ = reply.send(Reply::Ok);
                    break;
                }
                let answer = match dispatch(&mut game, command, now_ms()) {
                    Ok(answer) => answer,
                    Err(err) => {
                        tracing::debug!(room = %id, error = %err, "command rejected");
                        Reply::error(&err)
                    }
                };
                // The caller may have stopped waiting.
                let _ = reply.send(answer);
            }
            _ = ticker.tick() => {
                game.tick(now_ms());
            }
        }

        for event in game.drain_events() {
            // No subscribers is fine.
            let _ = events.send(event);
        }
        if game.is_over() && !reported {
            sink.record_results(&id, game.standings());
            reported = true;
        }
    }
    tracing::info!(room = %id, "room closed");
}

/// Rooms keyed by id.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<String, RoomHandle>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a room for `game` under `id`.
    pub async fn create(
        &self,
        id: &str,
        game: Game,
        sink: Arc<dyn ResultsSink>,
    ) -> Result<RoomHandle, RoomError> {
        let mut rooms = self.rooms.write().await;
        if rooms.get(id).is_some_and(|room| !room.is_closed()) {
            return Err(RoomError::AlreadyExists(id.to_string()));
        }
        let handle = spawn_room(id, game, sink);
        rooms.insert(id.to_string(), handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, id: &str) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(id.to_string()))
    }

    /// Drops the registry's handle. The room stops once every handle is gone.
    pub async fn remove(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.write().await.remove(id)
    }

    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.rooms.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
