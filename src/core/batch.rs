use crate::core::analyzer::{AnalyzerService, ExtractionFailure};
use crate::models::ImageRecord;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

/// Identifies one batch run within a session.
pub type BatchId = u64;

/// A path that produced no record, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedItem {
    pub path: PathBuf,
    pub reason: String,
}

impl From<&ExtractionFailure> for FailedItem {
    fn from(failure: &ExtractionFailure) -> Self {
        Self {
            path: failure.path.clone(),
            reason: failure.cause.to_string(),
        }
    }
}

/// Per-batch outcome. Records themselves go to the observer as they are
/// produced; the report keeps the counts and every skipped path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub analyzed: usize,
    pub failures: Vec<FailedItem>,
    pub cancelled: bool,
}

/// Receives batch notifications in order: per item a record or a failure
/// followed by a progress value, then exactly one completion.
pub trait BatchObserver {
    fn on_progress(&mut self, percent: u8);

    fn on_record(&mut self, record: ImageRecord);

    fn on_failure(&mut self, _failure: &ExtractionFailure) {}

    fn on_complete(&mut self, _report: &BatchReport) {}
}

/// Adapts a pair of closures to [`BatchObserver`].
pub struct FnObserver<P, R> {
    on_progress: P,
    on_record: R,
}

impl<P, R> BatchObserver for FnObserver<P, R>
where
    P: FnMut(u8),
    R: FnMut(ImageRecord),
{
    fn on_progress(&mut self, percent: u8) {
        (self.on_progress)(percent)
    }

    fn on_record(&mut self, record: ImageRecord) {
        (self.on_record)(record)
    }
}

/// Percentage of `completed` out of `total`, rounded half up.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((completed * 200 + total) / (2 * total)) as u8
}

/// Walks a path list strictly in order, one file at a time.
pub struct BatchRunner {
    analyzer: AnalyzerService,
    cancellation_token: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self {
            analyzer: AnalyzerService::new(),
            cancellation_token: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn get_cancellation_token(&self) -> Arc<AtomicBool> {
        self.cancellation_token.clone()
    }

    pub fn cancel(&self) {
        self.cancellation_token.store(true, Ordering::Relaxed);
    }

    /// Analyze every path, delivering each record as soon as it exists.
    ///
    /// A failing file never stops the batch. Cancellation is checked before
    /// each item; a cancelled run still reports completion.
    pub fn run<O>(&self, paths: &[PathBuf], observer: &mut O) -> BatchReport
    where
        O: BatchObserver + ?Sized,
    {
        let total = paths.len();
        let mut report = BatchReport {
            total,
            ..Default::default()
        };
        log::info!("Analyzing {} file(s)", total);

        for (index, path) in paths.iter().enumerate() {
            if self.cancellation_token.load(Ordering::Relaxed) {
                log::info!("Batch cancelled after {} of {} file(s)", index, total);
                report.cancelled = true;
                break;
            }

            match self.analyzer.analyze(path) {
                Ok(record) => {
                    report.analyzed += 1;
                    observer.on_record(record);
                }
                Err(failure) => {
                    log::warn!("{}", failure);
                    observer.on_failure(&failure);
                    report.failures.push(FailedItem::from(&failure));
                }
            }

            report.processed = index + 1;
            observer.on_progress(progress_percent(report.processed, total));
        }

        log::info!(
            "Batch finished: {} analyzed, {} skipped",
            report.analyzed,
            report.failures.len()
        );
        observer.on_complete(&report);
        report
    }

    /// [`run`](Self::run) with plain callbacks for progress and records.
    pub fn run_with<P, R>(&self, paths: &[PathBuf], on_progress: P, on_record: R) -> BatchReport
    where
        P: FnMut(u8),
        R: FnMut(ImageRecord),
    {
        let mut observer = FnObserver {
            on_progress,
            on_record,
        };
        self.run(paths, &mut observer)
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum BatchEvent {
    Progress(u8),
    Record(Box<ImageRecord>),
    Failed(FailedItem),
    Finished(BatchReport),
}

/// A [`BatchEvent`] tagged with the batch that produced it.
#[derive(Debug)]
pub struct BatchMessage {
    pub batch: BatchId,
    pub event: BatchEvent,
}

/// Forwards observer callbacks over a channel. Stops the run once the
/// receiving side is gone.
struct ChannelObserver {
    batch: BatchId,
    sender: mpsc::UnboundedSender<BatchMessage>,
    cancellation_token: Arc<AtomicBool>,
    // What has been forwarded so far, for the report of an aborted run
    sent: BatchReport,
}

impl ChannelObserver {
    fn new(
        batch: BatchId,
        sender: mpsc::UnboundedSender<BatchMessage>,
        cancellation_token: Arc<AtomicBool>,
    ) -> Self {
        Self {
            batch,
            sender,
            cancellation_token,
            sent: BatchReport::default(),
        }
    }

    fn send(&self, event: BatchEvent) {
        let message = BatchMessage {
            batch: self.batch,
            event,
        };
        if self.sender.send(message).is_err() {
            log::debug!("Receiver for batch {} closed; stopping", self.batch);
            self.cancellation_token.store(true, Ordering::Relaxed);
        }
    }
}

impl BatchObserver for ChannelObserver {
    fn on_progress(&mut self, percent: u8) {
        self.sent.processed += 1;
        self.send(BatchEvent::Progress(percent));
    }

    fn on_record(&mut self, record: ImageRecord) {
        self.sent.analyzed += 1;
        self.send(BatchEvent::Record(Box::new(record)));
    }

    fn on_failure(&mut self, failure: &ExtractionFailure) {
        let item = FailedItem::from(failure);
        self.sent.failures.push(item.clone());
        self.send(BatchEvent::Failed(item));
    }

    fn on_complete(&mut self, report: &BatchReport) {
        self.send(BatchEvent::Finished(report.clone()));
    }
}

/// A batch running on the blocking pool.
#[derive(Debug)]
pub struct BatchHandle {
    pub id: BatchId,
    cancellation_token: Arc<AtomicBool>,
    task: JoinHandle<BatchReport>,
}

impl BatchHandle {
    pub fn cancel(&self) {
        self.cancellation_token.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<BatchReport, JoinError> {
        self.task.await
    }
}

/// Start a batch off the caller's context. Must be called within a tokio
/// runtime; events arrive on `sender` tagged with `id`.
pub fn spawn_batch(
    id: BatchId,
    paths: Vec<PathBuf>,
    sender: mpsc::UnboundedSender<BatchMessage>,
) -> BatchHandle {
    let runner = BatchRunner::new();
    let cancellation_token = runner.get_cancellation_token();
    let mut observer = ChannelObserver::new(id, sender, cancellation_token.clone());

    let task = tokio::task::spawn_blocking(move || {
        finish_on_panic(&paths, &mut observer, |observer| runner.run(&paths, observer))
    });

    BatchHandle {
        id,
        cancellation_token,
        task,
    }
}

/// Run `body`, and if it unwinds, still deliver a completion carrying what
/// was sent before the panic. The item in flight is reported as failed and
/// the rest of the batch as not processed.
fn finish_on_panic<F>(paths: &[PathBuf], observer: &mut ChannelObserver, body: F) -> BatchReport
where
    F: FnOnce(&mut ChannelObserver) -> BatchReport,
{
    match panic::catch_unwind(AssertUnwindSafe(|| body(&mut *observer))) {
        Ok(report) => report,
        Err(e) => {
            log::error!("Batch {} panicked: {:?}", observer.batch, e);
            let mut report = std::mem::take(&mut observer.sent);
            report.total = paths.len();
            if let Some(path) = paths.get(report.processed) {
                let item = FailedItem {
                    path: path.clone(),
                    reason: "batch aborted by a panic".to_string(),
                };
                observer.send(BatchEvent::Failed(item.clone()));
                report.failures.push(item);
            }
            report.cancelled = true;
            observer.send(BatchEvent::Finished(report.clone()));
            report
        }
    }
}
