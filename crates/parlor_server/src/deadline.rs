//! Turn clock for timed games.
//!
//! The engine has no timer. This watcher sleeps until the room's current
//! deadline and expires the turn, re-reading the deadline whenever the room
//! changes.

use crate::room::{Broadcast, GameRoom};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Spawns the watcher for `room`. Broadcasts of expired turns go to `sink`;
/// the task ends once `sink` is closed.
pub fn spawn_turn_watcher(room: Arc<GameRoom>, sink: mpsc::Sender<Broadcast>) -> JoinHandle<()> {
    tokio::spawn(watch(room, sink))
}

#[instrument(skip_all, fields(room = %room.id()))]
async fn watch(room: Arc<GameRoom>, sink: mpsc::Sender<Broadcast>) {
    info!("Turn watcher started");
    loop {
        let changed = room.changes().notified();
        tokio::pin!(changed);
        // Register before reading the deadline so no change slips between.
        changed.as_mut().enable();

        let Some(deadline) = room.turn_deadline().await else {
            tokio::select! {
                _ = &mut changed => {}
                _ = sink.closed() => break,
            }
            continue;
        };

        let wait = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        debug!(%deadline, wait_ms = wait.as_millis() as u64, "Waiting for deadline");
        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                let now = Utc::now().max(deadline);
                match room.expire_turn(now).await {
                    Ok(broadcast) => {
                        if sink.send(broadcast).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "Turn not expired, waiting for a change");
                        tokio::select! {
                            _ = &mut changed => {}
                            _ = sink.closed() => break,
                        }
                    }
                }
            }
            _ = &mut changed => {}
            _ = sink.closed() => break,
        }
    }
    info!("Turn watcher stopped");
}
