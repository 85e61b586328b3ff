use chrono::Utc;
use pixpress_core::{AppError, ImageRecord, ProcessingOptions, SourceFile};
use pixpress_services::{archive_file_name, build_archive, ImageEditor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::queue::{BatchJob, BatchJobQueue, JobContext, RunReport};
use crate::store::{BatchStore, BatchSummary};

/// Built archive ready to be served
#[derive(Debug, Clone)]
pub struct BatchArchive {
    pub file_name: String,
    pub data: Vec<u8>,
    pub entries: usize,
}

/// Owns the batch and is the only writer of record status.
#[derive(Clone)]
pub struct BatchOrchestrator {
    store: BatchStore,
    queue: BatchJobQueue,
    busy: Arc<AtomicBool>,
    editor_name: &'static str,
}

impl BatchOrchestrator {
    /// Spawns the batch worker; must be called inside a tokio runtime.
    pub fn new(editor: Arc<dyn ImageEditor>, queue_size: usize) -> Self {
        let store = BatchStore::new();
        let busy = Arc::new(AtomicBool::new(false));
        let editor_name = editor.name();
        let queue = BatchJobQueue::new(
            JobContext {
                store: store.clone(),
                editor,
                busy: busy.clone(),
            },
            queue_size,
        );

        Self {
            store,
            queue,
            busy,
            editor_name,
        }
    }

    pub fn editor_name(&self) -> &'static str {
        self.editor_name
    }

    pub fn is_processing(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Append a pending record for every `image/*` file. Other files are
    /// skipped; if none qualifies the call fails and the batch is unchanged.
    #[tracing::instrument(skip_all, fields(files = files.len()))]
    pub async fn add(&self, files: Vec<SourceFile>) -> Result<Vec<ImageRecord>, AppError> {
        let (images, rejected): (Vec<_>, Vec<_>) =
            files.into_iter().partition(SourceFile::is_image);

        for file in &rejected {
            tracing::debug!(
                file_name = %file.file_name,
                content_type = %file.content_type,
                "Ignoring non-image upload"
            );
        }

        if images.is_empty() {
            return Err(AppError::InvalidInput("No image files provided".to_string()));
        }

        let records: Vec<ImageRecord> = images.into_iter().map(ImageRecord::new).collect();
        self.store.append(records.clone()).await;

        tracing::info!(
            added = records.len(),
            ignored = rejected.len(),
            "Images added to batch"
        );
        Ok(records)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.store
            .remove(id)
            .await
            .map(|record| {
                tracing::debug!(image_id = %id, status = %record.status(), "Image removed from batch");
            })
            .ok_or_else(|| AppError::NotFound(format!("Image {} not found", id)))
    }

    pub async fn get(&self, id: Uuid) -> Result<ImageRecord, AppError> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Image {} not found", id)))
    }

    pub async fn records(&self) -> Vec<ImageRecord> {
        self.store.snapshot().await
    }

    pub async fn summary(&self) -> BatchSummary {
        self.store.summary(self.is_processing()).await
    }

    /// Process every pending record sequentially with `options` and wait for
    /// the run to finish. Rejected while another run is in progress.
    #[tracing::instrument(skip(self), fields(editor = self.editor_name))]
    pub async fn process_all(&self, options: ProcessingOptions) -> Result<RunReport, AppError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::Conflict("Batch is already processing".to_string()));
        }

        let (reply, rx) = oneshot::channel();
        if let Err(e) = self.queue.submit(BatchJob::ProcessAll { options, reply }) {
            self.busy.store(false, Ordering::SeqCst);
            return Err(e);
        }

        rx.await
            .map_err(|_| AppError::Internal("Batch run ended without a report".to_string()))
    }

    /// Clear the batch. A non-empty batch needs `confirm`.
    pub async fn reset(&self, confirm: bool) -> Result<usize, AppError> {
        let count = self.store.len().await;
        if count > 0 && !confirm {
            return Err(AppError::ConfirmationRequired(format!(
                "Reset would discard {} image(s); repeat with confirm=true",
                count
            )));
        }

        let removed = self.store.clear().await;
        if self.is_processing() {
            tracing::info!(removed, "Batch reset during a run, remaining results will be dropped");
        } else {
            tracing::info!(removed, "Batch reset");
        }
        Ok(removed)
    }

    /// ZIP of every completed record. Fails when there is nothing to download.
    pub async fn download_archive(&self) -> Result<BatchArchive, AppError> {
        let records = self.store.snapshot().await;
        let entries = records.iter().filter(|r| r.is_archivable()).count();
        if entries == 0 {
            return Err(AppError::Conflict(
                "No processed images available for download".to_string(),
            ));
        }

        let data = build_archive(&records)?;
        let file_name = archive_file_name(Utc::now());
        tracing::info!(entries, size = data.len(), file_name = %file_name, "Archive generated");

        Ok(BatchArchive {
            file_name,
            data,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pixpress_core::{ErrorMetadata, ImageStatus, ProcessedImage};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::{Notify, Semaphore};

    /// Returns a fixed blob, or the configured error for a file name
    #[derive(Default)]
    struct MockEditor {
        calls: Mutex<Vec<String>>,
        failures: HashMap<String, u16>,
    }

    impl MockEditor {
        fn failing(name: &str, status: u16) -> Self {
            Self {
                failures: HashMap::from([(name.to_string(), status)]),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageEditor for MockEditor {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn edit(
            &self,
            source: &SourceFile,
            _options: &ProcessingOptions,
        ) -> Result<ProcessedImage, AppError> {
            self.calls.lock().unwrap().push(source.file_name.clone());
            if let Some(status) = self.failures.get(&source.file_name) {
                return Err(AppError::Upstream {
                    status: *status,
                    body: r#"{"error":"rate limited"}"#.to_string(),
                });
            }
            Ok(ProcessedImage::new(vec![1u8; 4], "image/jpeg"))
        }
    }

    /// Blocks inside every edit until the test hands out a permit
    struct GatedEditor {
        entered: Arc<Notify>,
        release: Arc<Semaphore>,
    }

    #[async_trait]
    impl ImageEditor for GatedEditor {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn edit(
            &self,
            _source: &SourceFile,
            _options: &ProcessingOptions,
        ) -> Result<ProcessedImage, AppError> {
            self.entered.notify_one();
            self.release.acquire().await.unwrap().forget();
            Ok(ProcessedImage::new(vec![2u8; 3], "image/jpeg"))
        }
    }

    struct PanickingEditor;

    #[async_trait]
    impl ImageEditor for PanickingEditor {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn edit(
            &self,
            _source: &SourceFile,
            _options: &ProcessingOptions,
        ) -> Result<ProcessedImage, AppError> {
            panic!("editor blew up");
        }
    }

    fn image(name: &str, size: usize) -> SourceFile {
        SourceFile::new(name, "image/jpeg", vec![0u8; size])
    }

    fn gated() -> (BatchOrchestrator, Arc<Notify>, Arc<Semaphore>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Semaphore::new(0));
        let editor = GatedEditor {
            entered: entered.clone(),
            release: release.clone(),
        };
        (BatchOrchestrator::new(Arc::new(editor), 4), entered, release)
    }

    #[tokio::test]
    async fn test_add_two_images_creates_pending_records() {
        let batch = BatchOrchestrator::new(Arc::new(MockEditor::default()), 4);
        let added = batch
            .add(vec![image("a.jpg", 120), image("b.jpg", 340)])
            .await
            .unwrap();

        assert_eq!(added.len(), 2);
        assert_ne!(added[0].id(), added[1].id());
        let records = batch.records().await;
        assert!(records.iter().all(|r| r.status() == ImageStatus::Pending));
        assert_eq!(records[0].original_size(), 120);
        assert_eq!(records[1].original_size(), 340);
        assert_eq!(batch.summary().await.total_original_size, 460);
    }

    #[tokio::test]
    async fn test_add_ignores_non_images() {
        let batch = BatchOrchestrator::new(Arc::new(MockEditor::default()), 4);
        let added = batch
            .add(vec![
                image("a.jpg", 1),
                SourceFile::new("notes.txt", "text/plain", b"hi".to_vec()),
            ])
            .await
            .unwrap();
        assert_eq!(added.len(), 1);

        let err = batch
            .add(vec![SourceFile::new("notes.txt", "text/plain", b"hi".to_vec())])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(batch.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_process_all_handles_every_pending_record_once() {
        let editor = Arc::new(MockEditor::default());
        let batch = BatchOrchestrator::new(editor.clone(), 4);
        batch
            .add(vec![image("1.jpg", 10), image("2.jpg", 10), image("3.jpg", 10)])
            .await
            .unwrap();

        assert!(!batch.is_processing());
        let report = batch.process_all(ProcessingOptions::default()).await.unwrap();
        assert!(!batch.is_processing());

        assert_eq!(report.processed, 3);
        assert_eq!(report.completed, 3);
        assert_eq!(editor.calls(), vec!["1.jpg", "2.jpg", "3.jpg"]);

        let summary = batch.summary().await;
        assert_eq!(summary.pending, 0);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.total_processed_size, 12);
        assert!(summary.download_ready);

        // Completed records are not edited again
        batch.add(vec![image("4.jpg", 10)]).await.unwrap();
        let report = batch.process_all(ProcessingOptions::default()).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(editor.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_upstream_failure_marks_record_and_continues() {
        let editor = Arc::new(MockEditor::failing("bad.jpg", 503));
        let batch = BatchOrchestrator::new(editor, 4);
        batch
            .add(vec![image("bad.jpg", 10), image("good.jpg", 10)])
            .await
            .unwrap();

        let report = batch.process_all(ProcessingOptions::default()).await.unwrap();
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 1);

        let records = batch.records().await;
        assert_eq!(records[0].status(), ImageStatus::Error);
        assert_eq!(records[0].error_message(), Some("Claid API error: 503"));
        assert!(records[0].processed().is_none());
        assert_eq!(records[1].status(), ImageStatus::Completed);
    }

    #[tokio::test]
    async fn test_panicking_editor_fails_record_and_keeps_worker() {
        let batch = BatchOrchestrator::new(Arc::new(PanickingEditor), 4);
        batch.add(vec![image("boom.jpg", 10)]).await.unwrap();

        let err = batch
            .process_all(ProcessingOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(!batch.is_processing());

        let records = batch.records().await;
        assert_eq!(records[0].status(), ImageStatus::Error);
        assert_eq!(records[0].error_message(), Some("Processing was interrupted"));

        // The worker still accepts runs
        batch.add(vec![image("next.jpg", 10)]).await.unwrap();
        let err = batch
            .process_all(ProcessingOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_second_run_is_rejected_while_busy() {
        let (batch, entered, release) = gated();
        batch.add(vec![image("a.jpg", 5)]).await.unwrap();

        let running = {
            let batch = batch.clone();
            tokio::spawn(async move { batch.process_all(ProcessingOptions::default()).await })
        };
        entered.notified().await;

        assert!(batch.is_processing());
        assert_eq!(batch.summary().await.processing, 1);
        let err = batch
            .process_all(ProcessingOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 409);

        release.add_permits(1);
        let report = running.await.unwrap().unwrap();
        assert_eq!(report.completed, 1);
        assert!(!batch.is_processing());
    }

    #[tokio::test]
    async fn test_records_removed_mid_run_are_dropped() {
        let (batch, entered, release) = gated();
        let added = batch
            .add(vec![image("first.jpg", 5), image("second.jpg", 5), image("third.jpg", 5)])
            .await
            .unwrap();

        let running = {
            let batch = batch.clone();
            tokio::spawn(async move { batch.process_all(ProcessingOptions::default()).await })
        };
        entered.notified().await;

        // first.jpg is being edited, second.jpg is still pending
        batch.remove(added[0].id()).await.unwrap();
        batch.remove(added[1].id()).await.unwrap();
        release.add_permits(2);

        let report = running.await.unwrap().unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.completed, 1);

        let records = batch.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name(), "third.jpg");
        assert_eq!(records[0].status(), ImageStatus::Completed);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_not_found() {
        let batch = BatchOrchestrator::new(Arc::new(MockEditor::default()), 4);
        let err = batch.remove(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation_when_not_empty() {
        let batch = BatchOrchestrator::new(Arc::new(MockEditor::default()), 4);
        assert_eq!(batch.reset(false).await.unwrap(), 0);

        batch.add(vec![image("a.jpg", 1)]).await.unwrap();
        let err = batch.reset(false).await.unwrap_err();
        assert!(matches!(err, AppError::ConfirmationRequired(_)));
        assert_eq!(batch.records().await.len(), 1);

        assert_eq!(batch.reset(true).await.unwrap(), 1);
        assert!(batch.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_download_requires_completed_records() {
        let editor = Arc::new(MockEditor::failing("bad.jpg", 500));
        let batch = BatchOrchestrator::new(editor, 4);
        batch
            .add(vec![image("bad.jpg", 3), image("ok.jpg", 3)])
            .await
            .unwrap();

        let err = batch.download_archive().await.unwrap_err();
        assert_eq!(err.http_status_code(), 409);

        batch.process_all(ProcessingOptions::default()).await.unwrap();
        let archive = batch.download_archive().await.unwrap();
        assert_eq!(archive.entries, 1);
        assert!(archive.file_name.starts_with("processed-images-"));
        assert!(archive.file_name.ends_with(".zip"));

        let zip = zip::ZipArchive::new(std::io::Cursor::new(archive.data)).unwrap();
        assert_eq!(zip.file_names().collect::<Vec<_>>(), vec!["processed_ok.jpg"]);
    }
}
