use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::domain::RawReading;

/// Errors surfaced by the reading store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Read interface to the remote reading collection.
///
/// The store is an external collaborator; the dashboard core only ever reads
/// from it. Both operations return documents newest-first by the store's
/// server-side timestamp ordering. Callers over-fetch to compensate for
/// documents that validation will drop.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Up to `limit` most-recent raw documents, newest first.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RawReading>, StoreError>;

    /// Subscribe to change notifications. Each delivery carries a fresh
    /// newest-first batch of up to `limit` documents.
    async fn subscribe_recent(&self, limit: usize) -> Result<ReadingSubscription, StoreError>;
}

/// Live feed of reading batches.
///
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// tears the feed down; the store stops delivering and prunes its side on the
/// next change. No batch is delivered after teardown.
pub struct ReadingSubscription {
    rx: mpsc::Receiver<Vec<RawReading>>,
}

impl ReadingSubscription {
    pub fn new(rx: mpsc::Receiver<Vec<RawReading>>) -> Self {
        Self { rx }
    }

    /// Wait for the next batch. `None` once the feed ends.
    pub async fn next_batch(&mut self) -> Option<Vec<RawReading>> {
        self.rx.recv().await
    }

    /// Tear the feed down explicitly.
    pub fn unsubscribe(self) {}
}

// Per-subscriber capacity. Deliveries carry the full latest batch, so a
// lagging subscriber can safely miss intermediate deliveries.
const SUBSCRIBER_BUFFER: usize = 8;

struct Subscriber {
    limit: usize,
    tx: mpsc::Sender<Vec<RawReading>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Documents in arrival order, oldest first.
    documents: Vec<RawReading>,
    subscribers: Vec<Subscriber>,
}

/// In-process implementation of [`ReadingStore`].
///
/// Backs the integration tests and the demo binary's replay feed. Seeded or
/// pushed documents get a store-assigned id when they carry none, the way the
/// real collection assigns document ids on write.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert documents without notifying subscribers. Used to establish the
    /// pre-existing collection contents before the dashboard attaches.
    pub async fn seed(&self, documents: Vec<RawReading>) {
        let mut inner = self.inner.write().await;
        for document in documents {
            inner.documents.push(with_assigned_id(document));
        }
    }

    /// Append one document and fan the fresh latest-batch out to every live
    /// subscriber.
    pub async fn push(&self, document: RawReading) {
        let mut inner = self.inner.write().await;
        inner.documents.push(with_assigned_id(document));

        inner.subscribers.retain(|subscriber| !subscriber.tx.is_closed());

        let inner = &*inner;
        for subscriber in &inner.subscribers {
            let batch = recent(&inner.documents, subscriber.limit);
            // A full buffer means the subscriber is lagging; the batch it
            // missed is superseded by the next delivery anyway.
            if subscriber.tx.try_send(batch).is_err() {
                debug!("subscriber lagging; skipped a delivery");
            }
        }
    }

    /// Number of documents currently held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.documents.is_empty()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RawReading>, StoreError> {
        let inner = self.inner.read().await;
        Ok(recent(&inner.documents, limit))
    }

    async fn subscribe_recent(&self, limit: usize) -> Result<ReadingSubscription, StoreError> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let mut inner = self.inner.write().await;
        inner.subscribers.push(Subscriber { limit, tx });
        Ok(ReadingSubscription::new(rx))
    }
}

fn recent(documents: &[RawReading], limit: usize) -> Vec<RawReading> {
    documents.iter().rev().take(limit).cloned().collect()
}

fn with_assigned_id(mut document: RawReading) -> RawReading {
    if document.id.is_none() {
        document.id = Some(Uuid::new_v4().to_string());
    }
    document
}
