use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::debugger::{CancelToken, Debugger, Snapshot, StopReason};
use crate::error::{ControlError, WorkerGone};
use crate::parser::SourceLine;
use crate::vm::Machine;

/// Requests handled by the worker thread, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Run,
    Step,
    Continue,
    Resume,
    AddBreakpoint(SourceLine),
    RemoveBreakpoint(SourceLine),
    Snapshot,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Stopped(StopReason),
    NotRunning,
    /// Number of sections added or removed.
    Breakpoints(usize),
    Snapshot(Snapshot),
}

/// Runs a [`Debugger`] on its own thread so a long `continue` can be
/// interrupted from the caller's thread.
///
/// An interrupt only stops a continuation already in flight; one raised
/// while the worker is idle or serving another request is discarded.
pub struct Worker<M> {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    cancel: CancelToken,
    handle: Option<JoinHandle<Debugger<M>>>,
}

fn control(result: Result<StopReason, ControlError>) -> Reply {
    match result {
        Ok(reason) => Reply::Stopped(reason),
        Err(ControlError::NotRunning) => Reply::NotRunning,
    }
}

fn serve<M: Machine>(
    mut debugger: Debugger<M>,
    requests: Receiver<Request>,
    replies: Sender<Reply>,
    cancel: CancelToken,
) -> Debugger<M> {
    for request in requests {
        debug!(?request, "worker request");
        let reply = match request {
            Request::Run => Reply::Stopped(debugger.run_from(0, &cancel)),
            Request::Step => control(debugger.step()),
            Request::Continue => control(debugger.continue_with(&cancel)),
            Request::Resume => control(debugger.resume(&cancel)),
            Request::AddBreakpoint(line) => Reply::Breakpoints(debugger.add_breakpoint(line)),
            Request::RemoveBreakpoint(line) => {
                Reply::Breakpoints(debugger.remove_breakpoint(line))
            }
            Request::Snapshot => Reply::Snapshot(debugger.snapshot()),
            Request::Shutdown => break,
        };
        if replies.send(reply).is_err() {
            warn!("reply channel closed, stopping worker");
            break;
        }
    }
    debugger
}

impl<M: Machine + Send + 'static> Worker<M> {
    pub fn spawn(debugger: Debugger<M>) -> Self {
        let (requests, request_rx) = channel();
        let (reply_tx, replies) = channel();
        let cancel = CancelToken::new();
        let token = cancel.clone();

        let handle = thread::spawn(move || serve(debugger, request_rx, reply_tx, token));

        Self {
            requests,
            replies,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn send(&self, request: Request) -> Result<(), WorkerGone> {
        self.requests.send(request).map_err(|_| WorkerGone)
    }

    /// Block until the next reply.
    pub fn recv(&self) -> Result<Reply, WorkerGone> {
        self.replies.recv().map_err(|_| WorkerGone)
    }

    /// `Ok(None)` when nothing arrived within `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Reply>, WorkerGone> {
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => Ok(Some(reply)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WorkerGone),
        }
    }

    /// Send a request and wait for its reply.
    pub fn request(&self, request: Request) -> Result<Reply, WorkerGone> {
        self.send(request)?;
        self.recv()
    }

    /// Stop the continuation currently running on the worker.
    pub fn interrupt(&self) {
        self.cancel.cancel();
    }

    /// Stop the worker and take the debugger back.
    pub fn shutdown(mut self) -> Result<Debugger<M>, WorkerGone> {
        self.cancel.cancel();
        let _ = self.requests.send(Request::Shutdown);
        let handle = self.handle.take().ok_or(WorkerGone)?;
        handle.join().map_err(|_| WorkerGone)
    }
}

impl<M> Drop for Worker<M> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.cancel();
            let _ = self.requests.send(Request::Shutdown);
            let _ = handle.join();
        }
    }
}
