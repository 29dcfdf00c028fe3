//! Background job runner service
//!
//! Each backend request runs on its own worker thread and reports back over
//! a channel that the UI thread drains on every tick. Messages carry the
//! dialog session they were started for; the caller decides whether the
//! session is still current.

use crate::model::dialog::ExportFormat;
use crate::model::field::{FieldNode, SelectionEntry};
use crate::model::report::ReportDefinition;
use crate::model::row::Row;
use crate::services::client::DocumentStore;
use crate::services::error::{ApiError, ExportError};
use crate::services::{export, fetcher, schema};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Schema,
    Preview,
    Export(ExportFormat),
}

#[derive(Debug)]
pub enum JobOutcome {
    Fields(Result<Vec<FieldNode>, ApiError>),
    Rows(Result<Vec<Row>, ApiError>),
    Exported(Result<PathBuf, ExportError>),
}

#[derive(Debug)]
pub struct JobMessage {
    pub session: u64,
    pub kind: JobKind,
    pub started: Instant,
    pub outcome: JobOutcome,
}

/// Job runner service for backend requests
pub struct JobRunner {
    store: Arc<dyn DocumentStore>,
    sender: Sender<JobMessage>,
    receiver: Receiver<JobMessage>,
    /// Jobs spawned but not yet drained by `poll`
    in_flight: usize,
}

impl JobRunner {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            store,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Replace the backend, e.g. after the connection settings changed
    pub fn set_store(&mut self, store: Arc<dyn DocumentStore>) {
        self.store = store;
    }

    fn spawn<F>(&mut self, session: u64, kind: JobKind, work: F)
    where
        F: FnOnce(&dyn DocumentStore) -> JobOutcome + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let tx = self.sender.clone();
        let started = Instant::now();
        debug!(session, ?kind, "spawning job");

        thread::spawn(move || {
            let outcome = work(store.as_ref());
            let _ = tx.send(JobMessage {
                session,
                kind,
                started,
                outcome,
            });
        });
        self.in_flight += 1;
    }

    /// Load the field list for `report`
    pub fn spawn_schema(&mut self, session: u64, report: ReportDefinition) {
        self.spawn(session, JobKind::Schema, move |store| {
            JobOutcome::Fields(schema::fetch_fields(store, &report))
        });
    }

    /// Fetch preview rows for the current selection
    pub fn spawn_preview(
        &mut self,
        session: u64,
        report: ReportDefinition,
        selection: Vec<SelectionEntry>,
    ) {
        self.spawn(session, JobKind::Preview, move |store| {
            JobOutcome::Rows(fetcher::fetch_rows(store, &report, &selection))
        });
    }

    /// Fetch rows and write them to `dir` as `format`
    pub fn spawn_export(
        &mut self,
        session: u64,
        report: ReportDefinition,
        selection: Vec<SelectionEntry>,
        format: ExportFormat,
        dir: PathBuf,
    ) {
        self.spawn(session, JobKind::Export(format), move |store| {
            JobOutcome::Exported(export::run_export(store, &report, &selection, format, &dir))
        });
    }

    /// Drain every finished job
    pub fn poll(&mut self) -> Vec<JobMessage> {
        let mut finished = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    finished.push(message);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row::CellValue;
    use crate::services::client::fake::MemoryStore;
    use std::time::Duration;

    fn wait_for(runner: &mut JobRunner, count: usize) -> Vec<JobMessage> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut messages = Vec::new();
        while messages.len() < count && Instant::now() < deadline {
            messages.extend(runner.poll());
            thread::sleep(Duration::from_millis(5));
        }
        messages
    }

    #[test]
    fn test_preview_job_reports_rows_with_session() {
        let store = MemoryStore::with_rows(
            "Employee",
            vec![Row::from_pairs([("name", CellValue::Text("EMP-1".to_string()))])],
        );
        let mut runner = JobRunner::new(Arc::new(store));
        let report = ReportDefinition::dynamic("Employees", "Employee");

        runner.spawn_preview(7, report, vec![SelectionEntry::new("name", "ID")]);
        assert_eq!(runner.in_flight(), 1);

        let messages = wait_for(&mut runner, 1);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].session, 7);
        assert_eq!(messages[0].kind, JobKind::Preview);
        assert!(matches!(&messages[0].outcome, JobOutcome::Rows(Ok(rows)) if rows.len() == 1));
        assert_eq!(runner.in_flight(), 0);
    }

    #[test]
    fn test_schema_failure_is_reported() {
        let mut runner = JobRunner::new(Arc::new(MemoryStore::failing("refused")));
        runner.spawn_schema(1, ReportDefinition::dynamic("Employees", "Employee"));

        let messages = wait_for(&mut runner, 1);
        assert!(matches!(
            &messages[0].outcome,
            JobOutcome::Fields(Err(ApiError::Network(_)))
        ));
    }

    #[test]
    fn test_export_job_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::with_rows(
            "Employee",
            vec![Row::from_pairs([("name", CellValue::Text("EMP-1".to_string()))])],
        );
        let mut runner = JobRunner::new(Arc::new(store));
        runner.spawn_export(
            3,
            ReportDefinition::dynamic("Employees", "Employee"),
            vec![SelectionEntry::new("name", "ID")],
            ExportFormat::Csv,
            dir.path().to_path_buf(),
        );

        let messages = wait_for(&mut runner, 1);
        assert_eq!(messages[0].kind, JobKind::Export(ExportFormat::Csv));
        match &messages[0].outcome {
            JobOutcome::Exported(Ok(path)) => assert!(path.exists()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
