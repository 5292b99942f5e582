use rusqlite::Connection;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::warn;

use crate::record::{RawRecord, RecordKind};
use crate::store::{self, StorageRoot};

/// The cross-process message contract, shape-stable regardless of
/// transport. Requests carry their reply sender; the service task
/// owning the store connection drains them one at a time, which is
/// what upholds the no-duplicate-id invariant — every merge, delete,
/// and clear is a serialized full-root read-modify-write.
enum Request {
    ExtractData {
        object_type: RecordKind,
        data: Vec<RawRecord>,
        reply: oneshot::Sender<ExtractDataReply>,
    },
    DeleteRecord {
        object_type: RecordKind,
        record_id: String,
        reply: oneshot::Sender<Ack>,
    },
    ClearAll {
        reply: oneshot::Sender<Ack>,
    },
    GetData {
        reply: oneshot::Sender<StorageRoot>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractDataReply {
    pub success: bool,
    pub count: usize,
    #[serde(rename = "objectType")]
    pub object_type: RecordKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub success: bool,
}

/// The receiving endpoint is gone — the caller surfaces this as its
/// own failure mode and never retries automatically.
#[derive(Debug, thiserror::Error)]
#[error("store channel unavailable")]
pub struct ChannelUnavailable;

#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<Request>,
    updates: broadcast::Sender<StorageRoot>,
}

/// Spawn the store service task. The task owns the connection; all
/// callers go through the returned handle.
pub fn spawn(conn: Connection) -> StoreHandle {
    let (tx, mut rx) = mpsc::channel(16);
    let (updates, _) = broadcast::channel(16);
    let broadcaster = updates.clone();

    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            handle_request(&conn, &broadcaster, request);
        }
    });

    StoreHandle { tx, updates }
}

fn handle_request(
    conn: &Connection,
    updates: &broadcast::Sender<StorageRoot>,
    request: Request,
) {
    match request {
        Request::ExtractData {
            object_type,
            data,
            reply,
        } => {
            let response = match store::merge(conn, object_type, data) {
                Ok(count) => {
                    if count > 0 {
                        notify(conn, updates);
                    }
                    ExtractDataReply {
                        success: true,
                        count,
                        object_type,
                        message: format!("Stored {count} {object_type}"),
                    }
                }
                Err(e) => {
                    warn!(kind = %object_type, "merge failed: {e:#}");
                    ExtractDataReply {
                        success: false,
                        count: 0,
                        object_type,
                        message: e.to_string(),
                    }
                }
            };
            let _ = reply.send(response);
        }
        Request::DeleteRecord {
            object_type,
            record_id,
            reply,
        } => {
            let success = match store::delete_record(conn, object_type, &record_id) {
                Ok(()) => {
                    notify(conn, updates);
                    true
                }
                Err(e) => {
                    warn!(kind = %object_type, id = %record_id, "delete failed: {e:#}");
                    false
                }
            };
            let _ = reply.send(Ack { success });
        }
        Request::ClearAll { reply } => {
            let success = match store::clear_all(conn) {
                Ok(()) => {
                    notify(conn, updates);
                    true
                }
                Err(e) => {
                    warn!("clear failed: {e:#}");
                    false
                }
            };
            let _ = reply.send(Ack { success });
        }
        Request::GetData { reply } => {
            let _ = reply.send(store::load(conn).unwrap_or_default());
        }
    }
}

/// Fire-and-forget `storageUpdated` broadcast after a mutation.
/// Nobody listening (or lagging receivers) is fine.
fn notify(conn: &Connection, updates: &broadcast::Sender<StorageRoot>) {
    if let Ok(root) = store::load(conn) {
        let _ = updates.send(root);
    }
}

impl StoreHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, ChannelUnavailable> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| ChannelUnavailable)?;
        reply_rx.await.map_err(|_| ChannelUnavailable)
    }

    pub async fn extract_data(
        &self,
        object_type: RecordKind,
        data: Vec<RawRecord>,
    ) -> Result<ExtractDataReply, ChannelUnavailable> {
        self.request(|reply| Request::ExtractData {
            object_type,
            data,
            reply,
        })
        .await
    }

    pub async fn delete_record(
        &self,
        object_type: RecordKind,
        record_id: String,
    ) -> Result<Ack, ChannelUnavailable> {
        self.request(|reply| Request::DeleteRecord {
            object_type,
            record_id,
            reply,
        })
        .await
    }

    pub async fn clear_all(&self) -> Result<Ack, ChannelUnavailable> {
        self.request(|reply| Request::ClearAll { reply }).await
    }

    pub async fn get_data(&self) -> Result<StorageRoot, ChannelUnavailable> {
        self.request(|reply| Request::GetData { reply }).await
    }

    /// Subscribe to `storageUpdated` notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageRoot> {
        self.updates.subscribe()
    }
}

// ── Tests ──
