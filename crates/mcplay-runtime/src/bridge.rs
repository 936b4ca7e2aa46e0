//! Execution bridge: run async work from synchronous callers.
//!
//! The bridge owns one multi-threaded tokio runtime, built on first use and
//! reused by every `run` until shutdown. Calls made from inside a
//! multi-threaded runtime (including the bridge's own) step out with
//! `block_in_place` instead of deadlocking.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Worker thread name prefix.
const THREAD_NAME: &str = "mcplay-bridge";

/// How long a synchronous shutdown waits for outstanding tasks.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

static NEXT_SCHEDULER_ID: AtomicU64 = AtomicU64::new(1);

/// Errors raised by the execution bridge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// The runtime could not be built.
    #[error("Failed to start the async runtime: {0}")]
    Build(String),

    /// `shutdown` already ran.
    #[error("Execution bridge has been shut down")]
    ShutDown,

    /// Blocking is impossible from a current-thread runtime.
    #[error("Cannot block inside a current-thread runtime")]
    CurrentThreadRuntime,
}

enum BridgeState {
    Idle,
    Running { runtime: Runtime, id: u64 },
    ShutDown,
}

/// Shared scheduler for synchronous callers.
pub struct ExecutionBridge {
    state: Mutex<BridgeState>,
}

impl Default for ExecutionBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionBridge {
    /// Create a bridge. The runtime is built on first use.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(BridgeState::Idle),
        }
    }

    /// Block until `future` completes on the shared runtime.
    ///
    /// Panics inside the future propagate to the caller.
    pub fn run<F: Future>(&self, future: F) -> Result<F::Output, BridgeError> {
        let handle = self.handle()?;

        match Handle::try_current() {
            Ok(current) if current.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                Err(BridgeError::CurrentThreadRuntime)
            }
            Ok(_) => Ok(tokio::task::block_in_place(|| handle.block_on(future))),
            Err(_) => Ok(handle.block_on(future)),
        }
    }

    /// Identity of the runtime, building it if needed.
    ///
    /// Stable for the lifetime of the bridge.
    pub fn scheduler_id(&self) -> Result<u64, BridgeError> {
        let mut state = self.lock();
        Self::ensure_running(&mut state).map(|(_, id)| id)
    }

    /// Cancel outstanding work and release the runtime.
    ///
    /// Runs at most once; later calls are no-ops.
    pub fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.lock(), BridgeState::ShutDown);
        let BridgeState::Running { runtime, id } = previous else {
            return;
        };

        tracing::debug!(scheduler_id = id, "Shutting down execution bridge");
        // Dropping or blocking on a runtime is not allowed from async code.
        if Handle::try_current().is_ok() {
            runtime.shutdown_background();
        } else {
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
        }
    }

    pub fn is_shut_down(&self) -> bool {
        matches!(*self.lock(), BridgeState::ShutDown)
    }

    fn handle(&self) -> Result<Handle, BridgeError> {
        let mut state = self.lock();
        Self::ensure_running(&mut state).map(|(handle, _)| handle)
    }

    fn ensure_running(state: &mut BridgeState) -> Result<(Handle, u64), BridgeError> {
        match state {
            BridgeState::Running { runtime, id } => Ok((runtime.handle().clone(), *id)),
            BridgeState::ShutDown => Err(BridgeError::ShutDown),
            BridgeState::Idle => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .thread_name(THREAD_NAME)
                    .build()
                    .map_err(|e| BridgeError::Build(e.to_string()))?;
                let id = NEXT_SCHEDULER_ID.fetch_add(1, Ordering::Relaxed);
                let handle = runtime.handle().clone();
                tracing::debug!(scheduler_id = id, "Execution bridge runtime started");
                *state = BridgeState::Running { runtime, id };
                Ok((handle, id))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ExecutionBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
