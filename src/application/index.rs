//! The process-wide document index.
//!
//! At most one [`VectorIndex`] is live at a time. Writers (uploads and lazy
//! builds from inline documents) are serialized by a writer lock and publish a
//! finished index in a single swap; readers take an `Arc` snapshot, so a query
//! sees either the previous index or the new one, never a partial build.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{ports::VectorStore, DomainError};

/// Where the live index came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IndexOrigin {
    Upload {
        #[serde(rename = "fileName")]
        file_name: String,
    },
    Inline {
        documents: usize,
    },
}

pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    origin: IndexOrigin,
    chunk_count: usize,
    indexed_at: DateTime<Utc>,
}

impl VectorIndex {
    pub fn new(store: Arc<dyn VectorStore>, origin: IndexOrigin, chunk_count: usize) -> Self {
        Self {
            store,
            origin,
            chunk_count,
            indexed_at: Utc::now(),
        }
    }

    pub fn store(&self) -> &dyn VectorStore {
        self.store.as_ref()
    }

    pub fn origin(&self) -> &IndexOrigin {
        &self.origin
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }
}

#[derive(Clone, Default)]
pub enum IndexState {
    #[default]
    Empty,
    Ready(Arc<VectorIndex>),
}

/// Snapshot of the lifecycle for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum IndexStatus {
    Empty,
    /// A writer holds the lock; `previous` is what readers still see.
    Building { previous: Option<IndexSummary> },
    Ready(IndexSummary),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    pub chunk_count: usize,
    pub origin: IndexOrigin,
    pub indexed_at: DateTime<Utc>,
}

impl From<&VectorIndex> for IndexSummary {
    fn from(index: &VectorIndex) -> Self {
        Self {
            chunk_count: index.chunk_count,
            origin: index.origin.clone(),
            indexed_at: index.indexed_at,
        }
    }
}

#[derive(Default)]
pub struct IndexHandle {
    state: RwLock<IndexState>,
    writer: Mutex<()>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live index, if any.
    pub async fn current(&self) -> Option<Arc<VectorIndex>> {
        match &*self.state.read().await {
            IndexState::Empty => None,
            IndexState::Ready(index) => Some(Arc::clone(index)),
        }
    }

    /// Builds under the writer lock and publishes the result, discarding
    /// whatever was live. A failed build leaves the previous index live.
    pub async fn replace<F, Fut>(&self, build: F) -> Result<Arc<VectorIndex>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<VectorIndex, DomainError>>,
    {
        let _writer = self.writer.lock().await;
        let index = build().await?;
        Ok(self.publish(index).await)
    }

    /// Returns the live index, building and publishing one with `build` if empty.
    ///
    /// The emptiness check is repeated under the writer lock, so an upload that
    /// finishes first wins and `build` is not called.
    pub async fn get_or_build_with<F, Fut>(
        &self,
        build: F,
    ) -> Result<Arc<VectorIndex>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<VectorIndex, DomainError>>,
    {
        if let Some(index) = self.current().await {
            return Ok(index);
        }

        let _writer = self.writer.lock().await;
        if let Some(index) = self.current().await {
            return Ok(index);
        }

        let index = build().await?;
        Ok(self.publish(index).await)
    }

    pub async fn status(&self) -> IndexStatus {
        let previous = self.current().await.map(|index| IndexSummary::from(&*index));

        if self.writer.try_lock().is_err() {
            return IndexStatus::Building { previous };
        }

        match previous {
            Some(summary) => IndexStatus::Ready(summary),
            None => IndexStatus::Empty,
        }
    }

    async fn publish(&self, index: VectorIndex) -> Arc<VectorIndex> {
        let index = Arc::new(index);
        *self.state.write().await = IndexState::Ready(Arc::clone(&index));
        tracing::info!(
            chunk_count = index.chunk_count,
            origin = ?index.origin,
            "document index replaced"
        );
        index
    }
}
