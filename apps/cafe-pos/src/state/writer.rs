//! # Snapshot Writer
//!
//! One background task owns every snapshot write, so saves reach the
//! database in the order the store changes happened.
//!
//! ## Write Queue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  mutate (lock held) ──► enqueue(Save[menu, inventory, orders])          │
//! │  mutate (lock held) ──► enqueue(Save[orders])                           │
//! │  flush  (lock held) ──► enqueue(Flush[all four], reply)                 │
//! │                              │                                          │
//! │                              ▼  unbounded mpsc, FIFO                    │
//! │  ┌───────────────────────────────────────────────────────────────┐      │
//! │  │  writer task                                                  │      │
//! │  │  1. recv one job, drain whatever else is already queued       │      │
//! │  │  2. keep only the newest payload per namespace                │      │
//! │  │  3. save_raw each, warn! on failure                           │      │
//! │  │  4. answer Flush once everything before it is written         │      │
//! │  └───────────────────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Jobs are enqueued while the store lock is held. Queue order is
//! therefore mutation order, and an older payload never lands after a
//! newer one.

use std::future::Future;

use cafe_db::{Database, DbError, DbResult, SnapshotRepository};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Encoded stores waiting to be saved: `(namespace, payload)`.
pub type Payloads = Vec<(&'static str, String)>;

enum WriteJob {
    Save(Payloads),
    Flush {
        payloads: Payloads,
        done: oneshot::Sender<DbResult<()>>,
    },
}

/// Handle to the background writer. Cloning shares the same queue.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    tx: mpsc::UnboundedSender<WriteJob>,
}

impl SnapshotWriter {
    /// Spawns the writer task on the current runtime.
    ///
    /// The task stops once every handle is dropped.
    pub fn spawn(db: Database) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(db.snapshots(), rx));
        SnapshotWriter { tx }
    }

    /// Queues payloads for saving. Never blocks.
    pub fn enqueue(&self, payloads: Payloads) {
        if payloads.is_empty() {
            return;
        }
        if self.tx.send(WriteJob::Save(payloads)).is_err() {
            warn!("Snapshot writer stopped, store changes not saved");
        }
    }

    /// Queues a final write right away. The returned future resolves once
    /// it, and everything queued before it, has been written.
    pub fn flush(&self, payloads: Payloads) -> impl Future<Output = DbResult<()>> {
        let (done, rx) = oneshot::channel();
        // A failed send drops `done`, so `rx` reports the stopped writer.
        let _ = self.tx.send(WriteJob::Flush { payloads, done });
        async move {
            rx.await
                .unwrap_or_else(|_| Err(DbError::Internal("snapshot writer stopped".into())))
        }
    }
}

async fn run(snapshots: SnapshotRepository, mut rx: mpsc::UnboundedReceiver<WriteJob>) {
    let mut pending = Payloads::new();

    while let Some(job) = rx.recv().await {
        let mut next = Some(job);
        while let Some(job) = next.take() {
            match job {
                WriteJob::Save(payloads) => coalesce(&mut pending, payloads),
                WriteJob::Flush { payloads, done } => {
                    coalesce(&mut pending, payloads);
                    let result = write_pending(&snapshots, &mut pending).await;
                    let _ = done.send(result);
                }
            }
            next = rx.try_recv().ok();
        }

        // Failures are already logged per namespace.
        write_pending(&snapshots, &mut pending).await.ok();
    }

    debug!("Snapshot writer stopped");
}

/// Keeps the newest payload per namespace.
fn coalesce(pending: &mut Payloads, payloads: Payloads) {
    for (namespace, payload) in payloads {
        match pending.iter_mut().find(|(ns, _)| *ns == namespace) {
            Some(slot) => slot.1 = payload,
            None => pending.push((namespace, payload)),
        }
    }
}

/// Writes and clears `pending`. Returns the first failure.
async fn write_pending(snapshots: &SnapshotRepository, pending: &mut Payloads) -> DbResult<()> {
    let mut result = Ok(());
    for (namespace, payload) in pending.drain(..) {
        if let Err(e) = snapshots.save_raw(namespace, &payload).await {
            warn!(namespace, error = %e, "Failed to save store snapshot");
            if result.is_ok() {
                result = Err(e);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_db::DbConfig;

    #[test]
    fn test_coalesce_keeps_newest_per_namespace() {
        let mut pending = Payloads::new();
        coalesce(&mut pending, vec![("menu-storage", "1".into()), ("order-storage", "a".into())]);
        coalesce(&mut pending, vec![("menu-storage", "2".into())]);

        assert_eq!(
            pending,
            vec![("menu-storage", "2".to_string()), ("order-storage", "a".to_string())]
        );
    }

    #[tokio::test]
    async fn test_flush_waits_for_queued_saves() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let writer = SnapshotWriter::spawn(db.clone());

        for n in 0..100 {
            writer.enqueue(vec![("order-storage", n.to_string())]);
        }
        writer.flush(vec![("menu-storage", "{}".into())]).await.unwrap();

        let orders = db.snapshots().load_raw("order-storage").await.unwrap().unwrap();
        assert_eq!(orders.payload, "99");
        assert!(db.snapshots().load_raw("menu-storage").await.unwrap().is_some());
    }
}
