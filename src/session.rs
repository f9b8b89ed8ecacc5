//! State owned by the interactive side: the table rows, sort and theme
//! choice, and the single batch allowed to be in flight.
//!
//! Starting a batch while another runs cancels the old one and clears the
//! table. Late messages from a replaced batch carry a stale id and are
//! dropped on receipt, so they can never land in the new table.

use crate::config::AnalyzerConfig;
use crate::core::batch::{
    spawn_batch, BatchEvent, BatchHandle, BatchId, BatchMessage, BatchReport, FailedItem,
};
use crate::core::preview::{Preview, PreviewService};
use crate::models::ImageRecord;
use crate::table::{Column, SortOrder};
use crate::theme::{Theme, ThemeName};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Row {row} does not exist; the table has {rows} row(s)")]
    RowOutOfRange { row: usize, rows: usize },
}

/// What changed in the session after applying one batch message.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Progress(u8),
    RowInserted(usize),
    Skipped(FailedItem),
    Finished(BatchReport),
}

pub struct AnalyzerSession {
    config: AnalyzerConfig,
    preview_service: PreviewService,
    rows: Vec<ImageRecord>,
    sort: Option<(Column, SortOrder)>,
    next_batch: BatchId,
    active: Option<BatchHandle>,
    progress: Option<u8>,
    last_report: Option<BatchReport>,
    sender: mpsc::UnboundedSender<BatchMessage>,
    receiver: mpsc::UnboundedReceiver<BatchMessage>,
}

impl AnalyzerSession {
    pub fn new(config: AnalyzerConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            preview_service: PreviewService::with_bounds(config.preview_bounds),
            config,
            rows: Vec::new(),
            sort: None,
            next_batch: 1,
            active: None,
            progress: None,
            last_report: None,
            sender,
            receiver,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        self.config.theme.theme()
    }

    pub fn set_theme(&mut self, name: ThemeName) {
        self.config.theme = name;
    }

    pub fn rows(&self) -> &[ImageRecord] {
        &self.rows
    }

    /// `Some(percent)` while a batch runs; `None` hides the indicator.
    pub fn progress(&self) -> Option<u8> {
        self.progress
    }

    pub fn last_report(&self) -> Option<&BatchReport> {
        self.last_report.as_ref()
    }

    pub fn active_batch(&self) -> Option<BatchId> {
        self.active.as_ref().map(|handle| handle.id)
    }

    /// Cancel any running batch, clear the table and analyze `paths` in the
    /// background. Must be called within a tokio runtime.
    pub fn start_batch(&mut self, paths: Vec<PathBuf>) -> BatchId {
        if let Some(previous) = self.active.take() {
            log::info!("Replacing batch {} with a new selection", previous.id);
            previous.cancel();
        }

        self.rows.clear();
        self.last_report = None;
        self.progress = Some(0);

        let id = self.next_batch;
        self.next_batch += 1;
        self.active = Some(spawn_batch(id, paths, self.sender.clone()));
        id
    }

    /// Cancel the running batch, if any. Its completion still arrives and
    /// hides the progress indicator.
    pub fn cancel_batch(&self) {
        if let Some(handle) = &self.active {
            handle.cancel();
        }
    }

    /// Wait for the next change caused by the active batch. Returns `None`
    /// once no batch is in flight.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        while self.active.is_some() {
            let message = self.receiver.recv().await?;
            if let Some(update) = self.apply(message) {
                return Some(update);
            }
        }
        None
    }

    /// Apply one message from a batch. Messages from any batch other than
    /// the active one are discarded.
    pub fn apply(&mut self, message: BatchMessage) -> Option<SessionUpdate> {
        let current = self.active_batch()?;
        if message.batch != current {
            log::debug!("Dropping message from replaced batch {}", message.batch);
            return None;
        }

        let update = match message.event {
            BatchEvent::Progress(percent) => {
                self.progress = Some(percent);
                SessionUpdate::Progress(percent)
            }
            BatchEvent::Record(record) => SessionUpdate::RowInserted(self.insert_row(*record)),
            BatchEvent::Failed(item) => SessionUpdate::Skipped(item),
            BatchEvent::Finished(report) => {
                self.active = None;
                self.progress = None;
                self.last_report = Some(report.clone());
                SessionUpdate::Finished(report)
            }
        };
        Some(update)
    }

    /// Sort the table. Later rows are inserted in sorted position.
    pub fn sort_by(&mut self, column: Column, order: SortOrder) {
        self.sort = Some((column, order));
        self.rows.sort_by(|a, b| ordered(column, order, a, b));
    }

    pub fn row(&self, row: usize) -> Result<&ImageRecord, SessionError> {
        self.rows.get(row).ok_or(SessionError::RowOutOfRange {
            row,
            rows: self.rows.len(),
        })
    }

    /// Preview for the record currently shown at `row`.
    pub fn select(&self, row: usize) -> Result<Preview, SessionError> {
        let record = self.row(row)?;
        Ok(self.preview_service.preview(record))
    }

    fn insert_row(&mut self, record: ImageRecord) -> usize {
        let index = match self.sort {
            Some((column, order)) => self
                .rows
                .partition_point(|existing| ordered(column, order, existing, &record).is_le()),
            None => self.rows.len(),
        };
        self.rows.insert(index, record);
        index
    }
}

fn ordered(
    column: Column,
    order: SortOrder,
    a: &ImageRecord,
    b: &ImageRecord,
) -> std::cmp::Ordering {
    match order {
        SortOrder::Ascending => column.compare(a, b),
        SortOrder::Descending => column.compare(b, a),
    }
}
