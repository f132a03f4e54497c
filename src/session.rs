//! Scan session - one walk from a chosen root to a terminal status
//!
//! A session owns the cancellation flag and the status. Status moves
//! `Pending -> Running -> {Completed, Cancelled, Failed}` exactly once; a
//! finished session cannot be restarted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use crate::config::ScanOptions;
use crate::error::{BrowseError, BrowseErrorKind, Result};
use crate::models::{Entry, ScanEvent, ScanStatus, ScanSummary};
use crate::storage::StorageProvider;
use crate::walker;

/// Cooperative cancellation flag. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A single scan run
#[derive(Debug)]
pub struct ScanSession {
    options: ScanOptions,
    cancel: CancelToken,
    status: Mutex<ScanStatus>,
    files_found: AtomicU64,
}

impl ScanSession {
    /// Create a pending session with a snapshot of `options`
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            cancel: CancelToken::new(),
            status: Mutex::new(ScanStatus::Pending),
            files_found: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Request cancellation; observed at the walker's next check
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn status(&self) -> ScanStatus {
        *self.lock_status()
    }

    /// Entries emitted so far
    pub fn files_found(&self) -> u64 {
        self.files_found.load(Ordering::SeqCst)
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, ScanStatus> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Result<()> {
        let mut status = self.lock_status();
        if *status != ScanStatus::Pending {
            return Err(BrowseError::invalid_state(format!(
                "Scan session already {}; start a new session to rescan",
                status
            )));
        }
        *status = ScanStatus::Running;
        self.files_found.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn finish(&self, terminal: ScanStatus) {
        let mut status = self.lock_status();
        if *status == ScanStatus::Running {
            *status = terminal;
        }
    }

    /// Run the walk on the calling thread, handing each entry to `on_entry`
    /// as soon as it is found.
    ///
    /// Scan failures are reported in the summary, not as `Err`; `Err` means
    /// the session was already used.
    pub fn run<S, F>(&self, storage: &S, root: &S::Handle, mut on_entry: F) -> Result<ScanSummary>
    where
        S: StorageProvider + ?Sized,
        F: FnMut(Entry<S::Handle>),
    {
        self.begin()?;
        let start = Instant::now();
        let root_name = storage.name(root);
        log::info!(
            "Starting scan of {} (recursive: {}, exclusions: {})",
            root_name,
            self.options.recursive,
            self.options.exclusions.len()
        );

        let mut stats = walker::WalkStats::default();
        let outcome = walker::walk_with_stats(
            storage,
            root,
            &root_name,
            &self.options,
            &self.cancel,
            |entry| {
                self.files_found.fetch_add(1, Ordering::SeqCst);
                on_entry(entry);
            },
            &mut stats,
        );

        let mut summary = ScanSummary {
            dirs_visited: stats.dirs_visited,
            skipped: stats.skipped,
            ..Default::default()
        };
        match outcome {
            Ok(()) => {
                summary.status = if self.cancel.is_cancelled() {
                    ScanStatus::Cancelled
                } else {
                    ScanStatus::Completed
                };
            }
            Err(err) => {
                log::error!("Scan of {} failed: {}", root_name, err);
                summary.status = ScanStatus::Failed;
                summary.error = Some(err.to_string());
            }
        }
        summary.files_found = self.files_found();
        summary.duration_ms = start.elapsed().as_millis() as u64;

        self.finish(summary.status);
        log::info!(
            "Scan of {} {}: {} files in {}ms",
            root_name,
            summary.status,
            summary.files_found,
            summary.duration_ms
        );
        Ok(summary)
    }

    /// Run the session on a worker thread and stream its events.
    pub fn spawn<S>(self, storage: Arc<S>, root: S::Handle) -> Result<ScanHandle<S::Handle>>
    where
        S: StorageProvider + Send + Sync + 'static,
    {
        if self.status() != ScanStatus::Pending {
            return Err(BrowseError::invalid_state("Scan session already started"));
        }
        let session = Arc::new(self);
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = Arc::clone(&session);
        let thread = std::thread::spawn(move || run_worker(&worker, &*storage, &root, tx));
        Ok(ScanHandle {
            session,
            events: rx,
            thread,
        })
    }
}

fn run_worker<S>(
    session: &ScanSession,
    storage: &S,
    root: &S::Handle,
    tx: Sender<ScanEvent<S::Handle>>,
) -> ScanSummary
where
    S: StorageProvider + ?Sized,
{
    let result = session.run(storage, root, |entry| {
        if tx.send(ScanEvent::EntryFound(entry)).is_err() {
            // Nobody is listening any more
            session.cancel();
        }
    });
    let summary = result.unwrap_or_else(|err| ScanSummary {
        status: ScanStatus::Failed,
        error: Some(err.to_string()),
        ..Default::default()
    });
    if tx.send(ScanEvent::Terminal(summary.clone())).is_err() {
        log::debug!("Terminal event dropped, receiver gone");
    }
    summary
}

/// Handle to a session running on a worker thread
pub struct ScanHandle<H> {
    session: Arc<ScanSession>,
    events: Receiver<ScanEvent<H>>,
    thread: JoinHandle<ScanSummary>,
}

impl<H> ScanHandle<H> {
    pub fn cancel(&self) {
        self.session.cancel();
    }

    /// Entries in discovery order, then exactly one terminal event
    pub fn events(&self) -> &Receiver<ScanEvent<H>> {
        &self.events
    }

    pub fn status(&self) -> ScanStatus {
        self.session.status()
    }

    pub fn files_found(&self) -> u64 {
        self.session.files_found()
    }

    /// Wait for the worker and return its summary
    pub fn join(self) -> Result<ScanSummary> {
        self.thread.join().map_err(|_| {
            BrowseError::new(BrowseErrorKind::Unknown, None, "Scan worker panicked")
        })
    }
}
