//! Sequential batch job queue.
//!
//! A single worker drains a bounded channel and runs one job at a time, so
//! at most one image is being edited at any moment. Each job runs in its own
//! task. Where panics unwind, a panicking job has its in-flight records marked
//! `error` and the worker moves on; release builds abort on panic instead.

use pixpress_core::{AppError, ErrorMetadata, ProcessingOptions};
use pixpress_services::ImageEditor;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use utoipa::ToSchema;

use crate::store::BatchStore;

const INTERRUPTED_MESSAGE: &str = "Processing was interrupted";

/// Outcome counts of one Process All run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RunReport {
    /// Records taken from `pending` to `processing`
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    /// Results discarded because the record was removed mid-run
    pub dropped: usize,
}

#[derive(Debug)]
pub enum BatchJob {
    ProcessAll {
        options: ProcessingOptions,
        reply: oneshot::Sender<RunReport>,
    },
}

/// Clears the busy flag once a run and its cleanup are over.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub(crate) struct JobContext {
    pub store: BatchStore,
    pub editor: Arc<dyn ImageEditor>,
    pub busy: Arc<AtomicBool>,
}

#[derive(Clone)]
pub struct BatchJobQueue {
    tx: mpsc::Sender<BatchJob>,
}

impl BatchJobQueue {
    /// Create the queue and spawn its worker. Must be called inside a tokio runtime.
    pub(crate) fn new(context: JobContext, queue_size: usize) -> Self {
        let queue_size = queue_size.max(1);
        let (tx, rx) = mpsc::channel(queue_size);

        tokio::spawn(async move {
            Self::worker(rx, context).await;
        });

        tracing::info!(
            queue_size = queue_size,
            "Batch job queue initialized with bounded channel"
        );

        Self { tx }
    }

    #[tracing::instrument(skip(self, job), fields(job.type = "process_all"))]
    pub fn submit(&self, job: BatchJob) -> Result<(), AppError> {
        self.tx.try_send(job).map_err(|e| match &e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Batch job queue is full, rejecting job");
                AppError::Conflict("Batch job queue is full, please try again later".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                AppError::Internal("Batch worker is not running".to_string())
            }
        })
    }

    async fn worker(mut rx: mpsc::Receiver<BatchJob>, context: JobContext) {
        while let Some(job) = rx.recv().await {
            match job {
                BatchJob::ProcessAll { options, reply } => {
                    let busy = BusyGuard(context.busy.clone());
                    let run_context = context.clone();
                    let handle =
                        tokio::spawn(async move { process_all(&run_context, &options).await });

                    let report = match handle.await {
                        Ok(report) => Some(report),
                        Err(e) => {
                            let failed = context.store.fail_in_flight(INTERRUPTED_MESSAGE).await;
                            tracing::error!(error = %e, failed, "Batch job panicked");
                            None
                        }
                    };
                    drop(busy);

                    // Without a report, dropping `reply` fails the caller's wait
                    if let Some(report) = report {
                        if reply.send(report).is_err() {
                            tracing::debug!("Process All caller went away before the run finished");
                        }
                    }
                }
            }
        }
        tracing::debug!("Batch job queue closed, worker exiting");
    }
}

/// Edit every record that was pending when the run started, in insertion order.
#[tracing::instrument(skip_all, fields(editor = context.editor.name(), preset = options.preset.name, job.status = tracing::field::Empty))]
pub(crate) async fn process_all(context: &JobContext, options: &ProcessingOptions) -> RunReport {
    let start = std::time::Instant::now();
    let ids = context.store.pending_ids().await;
    let mut report = RunReport::default();

    tracing::info!(pending = ids.len(), "Starting batch run");

    for id in ids {
        let started = context
            .store
            .update(id, |record| {
                record
                    .start_processing()
                    .map(|_| record.source().clone())
            })
            .await;

        let source = match started {
            Some(Ok(source)) => source,
            Some(Err(e)) => {
                tracing::debug!(image_id = %id, error = %e, "Skipping record that is no longer pending");
                continue;
            }
            None => {
                tracing::debug!(image_id = %id, "Skipping record removed before processing");
                continue;
            }
        };
        report.processed += 1;

        let result = context.editor.edit(&source, options).await;
        let succeeded = result.is_ok();

        if let Err(e) = &result {
            tracing::warn!(
                image_id = %id,
                file_name = %source.file_name,
                error = %e,
                error_code = e.error_code(),
                "Image processing failed"
            );
        }

        let applied = context
            .store
            .update(id, |record| match result {
                Ok(processed) => record.complete(processed),
                Err(e) => record.fail(e.client_message()),
            })
            .await;

        match applied {
            Some(Ok(())) if succeeded => report.completed += 1,
            Some(Ok(())) => report.failed += 1,
            Some(Err(e)) => {
                tracing::error!(image_id = %id, error = %e, "Could not record processing result");
                report.failed += 1;
            }
            None => {
                tracing::debug!(image_id = %id, "Record removed during processing, result dropped");
                report.dropped += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    tracing::Span::current().record("job.status", "finished");
    tracing::info!(
        processed = report.processed,
        completed = report.completed,
        failed = report.failed,
        dropped = report.dropped,
        duration_ms = elapsed.as_millis(),
        "Batch run finished"
    );

    report
}
