//! In-memory batch of image records, kept in insertion order.

use pixpress_core::{ImageRecord, ImageStatus};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

/// Aggregates derived from the current records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchSummary {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub total_original_size: u64,
    /// Sum over records that have a processed blob
    pub total_processed_size: u64,
    pub is_processing: bool,
    /// At least one record can go into the archive
    pub download_ready: bool,
}

impl BatchSummary {
    pub fn from_records<'a, I>(records: I, is_processing: bool) -> Self
    where
        I: IntoIterator<Item = &'a ImageRecord>,
    {
        let mut summary = BatchSummary {
            is_processing,
            ..Default::default()
        };
        for record in records {
            summary.total += 1;
            summary.total_original_size += record.original_size();
            summary.total_processed_size += record.processed_size().unwrap_or(0);
            match record.status() {
                ImageStatus::Pending => summary.pending += 1,
                ImageStatus::Processing => summary.processing += 1,
                ImageStatus::Completed => summary.completed += 1,
                ImageStatus::Error => summary.failed += 1,
            }
            if record.is_archivable() {
                summary.download_ready = true;
            }
        }
        summary
    }
}

/// Shared handle to the batch. Clones point at the same records.
#[derive(Debug, Clone, Default)]
pub struct BatchStore {
    records: Arc<RwLock<Vec<ImageRecord>>>,
}

impl BatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, new_records: Vec<ImageRecord>) {
        self.records.write().await.extend(new_records);
    }

    pub async fn remove(&self, id: Uuid) -> Option<ImageRecord> {
        let mut records = self.records.write().await;
        let index = records.iter().position(|r| r.id() == id)?;
        Some(records.remove(index))
    }

    pub async fn get(&self, id: Uuid) -> Option<ImageRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Apply `f` to the record with `id`. `None` when the record is gone.
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut ImageRecord) -> R,
    {
        let mut records = self.records.write().await;
        records.iter_mut().find(|r| r.id() == id).map(f)
    }

    /// Ids of pending records in insertion order
    pub async fn pending_ids(&self) -> Vec<Uuid> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.status() == ImageStatus::Pending)
            .map(ImageRecord::id)
            .collect()
    }

    /// Mark every `processing` record as `error`, returning how many changed
    pub async fn fail_in_flight(&self, message: &str) -> usize {
        let mut records = self.records.write().await;
        let mut failed = 0;
        for record in records.iter_mut() {
            if record.status() == ImageStatus::Processing && record.fail(message).is_ok() {
                failed += 1;
            }
        }
        failed
    }

    pub async fn snapshot(&self) -> Vec<ImageRecord> {
        self.records.read().await.clone()
    }

    pub async fn summary(&self, is_processing: bool) -> BatchSummary {
        BatchSummary::from_records(self.records.read().await.iter(), is_processing)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop every record, returning how many were removed
    pub async fn clear(&self) -> usize {
        let mut records = self.records.write().await;
        let count = records.len();
        records.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixpress_core::{ProcessedImage, SourceFile};

    fn record(name: &str, size: usize) -> ImageRecord {
        ImageRecord::new(SourceFile::new(name, "image/jpeg", vec![0u8; size]))
    }

    #[tokio::test]
    async fn test_pending_ids_follow_insertion_order() {
        let store = BatchStore::new();
        let first = record("1.jpg", 1);
        let second = record("2.jpg", 1);
        let ids = vec![first.id(), second.id()];
        store.append(vec![first, second]).await;

        assert_eq!(store.pending_ids().await, ids);
        store.update(ids[0], |r| r.start_processing()).await.unwrap().unwrap();
        assert_eq!(store.pending_ids().await, vec![ids[1]]);
    }

    #[tokio::test]
    async fn test_update_on_removed_record_is_none() {
        let store = BatchStore::new();
        let r = record("a.jpg", 1);
        let id = r.id();
        store.append(vec![r]).await;

        assert!(store.remove(id).await.is_some());
        assert!(store.update(id, |r| r.start_processing()).await.is_none());
        assert!(store.remove(id).await.is_none());
    }

    #[tokio::test]
    async fn test_summary_aggregates() {
        let store = BatchStore::new();
        let mut done = record("done.jpg", 100);
        done.start_processing().unwrap();
        done.complete(ProcessedImage::new(vec![0u8; 40], "image/jpeg"))
            .unwrap();
        let mut running = record("running.jpg", 50);
        running.start_processing().unwrap();
        store
            .append(vec![done, running, record("waiting.jpg", 25)])
            .await;

        let summary = store.summary(true).await;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.processing, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.total_original_size, 175);
        assert_eq!(summary.total_processed_size, 40);
        assert!(summary.download_ready);
        assert!(summary.is_processing);
    }

    #[tokio::test]
    async fn test_fail_in_flight_only_touches_processing_records() {
        let store = BatchStore::new();
        let mut running = record("running.jpg", 1);
        running.start_processing().unwrap();
        let running_id = running.id();
        store.append(vec![running, record("waiting.jpg", 1)]).await;

        assert_eq!(store.fail_in_flight("Processing was interrupted").await, 1);
        let failed = store.get(running_id).await.unwrap();
        assert_eq!(failed.status(), ImageStatus::Error);
        assert_eq!(failed.error_message(), Some("Processing was interrupted"));
        assert_eq!(store.pending_ids().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_returns_count() {
        let store = BatchStore::new();
        store.append(vec![record("a.jpg", 1), record("b.jpg", 1)]).await;
        assert_eq!(store.clear().await, 2);
        assert!(store.is_empty().await);
    }
}
