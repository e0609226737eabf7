//! Background scan worker
//!
//! Owns a `ScanSession` on a dedicated thread so frame producers on other
//! threads never touch the vote tally directly. Frames and control commands
//! arrive over a channel and are applied strictly in order; the finished
//! record is delivered at most once on a result channel.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

use super::{ScanSession, SessionState};
use crate::capture::frame::ObservedFrame;
use crate::card::CardRecord;
use crate::config::ScannerConfig;
use crate::error::{Result, ScanError};

/// Commands processed by the worker thread
#[derive(Debug)]
enum WorkerCommand {
    /// Process one frame of observations
    Frame(ObservedFrame),
    /// Cancel the session
    Cancel,
    /// Exit the worker loop
    Shutdown,
}

/// Snapshot of the worker's session, readable from any thread
#[derive(Debug, Clone, Default)]
pub struct ScanStatus {
    /// Current session state
    pub state: SessionState,
    /// Frames processed so far
    pub frames_processed: u64,
    /// Whether a number-shaped candidate has been seen
    pub number_seen: bool,
    /// Fields accepted so far
    pub partial: CardRecord,
}

/// Handle to a scan session running on its own thread
pub struct ScanWorker {
    commands: Sender<WorkerCommand>,
    results: Receiver<CardRecord>,
    status: Arc<RwLock<ScanStatus>>,
    handle: Option<JoinHandle<()>>,
}

impl ScanWorker {
    /// Start a session on a new worker thread
    pub fn spawn(config: &ScannerConfig) -> Result<Self> {
        let mut session = ScanSession::new(config)?;
        let (result_tx, results) = bounded(1);
        session.start(move |record| {
            // Only one completion per session, so the slot is always free
            let _ = result_tx.try_send(record);
        })?;

        let status = Arc::new(RwLock::new(ScanStatus {
            state: session.state(),
            ..Default::default()
        }));
        let (commands, command_rx) = unbounded();

        let thread_status = status.clone();
        let handle = std::thread::Builder::new()
            .name("scan-worker".to_string())
            .spawn(move || run_worker(session, command_rx, thread_status))?;

        info!("Scan worker started");

        Ok(Self {
            commands,
            results,
            status,
            handle: Some(handle),
        })
    }

    /// Queue a frame for processing
    pub fn submit_frame(&self, frame: ObservedFrame) -> Result<()> {
        self.send(WorkerCommand::Frame(frame))
    }

    /// Cancel the session; no result will be delivered
    pub fn cancel(&self) -> Result<()> {
        self.send(WorkerCommand::Cancel)
    }

    /// Latest status snapshot
    pub fn status(&self) -> ScanStatus {
        self.status.read().clone()
    }

    /// Receiver for the completed record
    pub fn result_receiver(&self) -> Receiver<CardRecord> {
        self.results.clone()
    }

    /// Completed record, if one is ready
    pub fn try_result(&self) -> Option<CardRecord> {
        self.results.try_recv().ok()
    }

    /// Block until a record is delivered or the timeout elapses
    ///
    /// The worker keeps running after a timeout; call `cancel` to give up.
    pub fn wait_for_result(&self, timeout: Duration) -> Option<CardRecord> {
        self.results.recv_timeout(timeout).ok()
    }

    /// Drain queued commands and stop the thread
    ///
    /// Status and result stay readable afterwards; new commands are refused.
    pub fn shutdown(&mut self) {
        let _ = self.commands.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Shut down and return the result, if one was delivered
    pub fn finish(mut self) -> Option<CardRecord> {
        self.shutdown();
        self.results.try_recv().ok()
    }

    /// Check if the worker thread is alive
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    fn send(&self, command: WorkerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ScanError::WorkerDisconnected)
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    mut session: ScanSession,
    commands: Receiver<WorkerCommand>,
    status: Arc<RwLock<ScanStatus>>,
) {
    debug!("Scan worker thread running session {}", session.id());

    for command in commands.iter() {
        match command {
            WorkerCommand::Frame(frame) => {
                if let Err(e) = session.submit_frame(&frame.observations) {
                    debug!("Dropping frame: {}", e);
                    continue;
                }
            }
            WorkerCommand::Cancel => session.cancel(),
            WorkerCommand::Shutdown => break,
        }

        let mut snapshot = status.write();
        snapshot.state = session.state();
        snapshot.frames_processed = session.frames_processed();
        snapshot.number_seen = session.number_seen();
        snapshot.partial = session.record().clone();
    }

    debug!("Scan worker thread exiting");
}
