//! One-time initialization gate: Uninitialized -> Initializing -> Ready.
//!
//! A failed attempt moves the gate back to Uninitialized so a later call can
//! try again. Callers that were blocked on the failed attempt are told it
//! failed instead of starting their own fetch.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::IndexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Ready,
}

/// What a caller entering the gate must do next.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Entry {
    /// This caller owns the attempt and must call `finish_ok` or `finish_err`.
    Leader,
    Ready,
    /// The attempt this caller waited on failed with the given message.
    Failed(String),
}

#[derive(Debug)]
struct GateState {
    phase: Phase,
    failures: u64,
    last_failure: Option<String>,
}

#[derive(Debug)]
pub(crate) struct InitGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl InitGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                phase: Phase::Uninitialized,
                failures: 0,
                last_failure: None,
            }),
            changed: Condvar::new(),
        }
    }

    // State is only ever written whole under the lock, so a poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Explicit start. Fails fast unless the gate is Uninitialized.
    pub(crate) fn begin(&self) -> Result<(), IndexError> {
        let mut st = self.lock();
        if st.phase != Phase::Uninitialized {
            return Err(IndexError::AlreadyInitialized);
        }
        st.phase = Phase::Initializing;
        Ok(())
    }

    /// Lazy start: become the leader, or block until the running attempt ends.
    pub(crate) fn enter(&self) -> Entry {
        let mut st = self.lock();
        match st.phase {
            Phase::Ready => Entry::Ready,
            Phase::Uninitialized => {
                st.phase = Phase::Initializing;
                Entry::Leader
            }
            Phase::Initializing => {
                let seen = st.failures;
                while st.phase == Phase::Initializing {
                    st = self
                        .changed
                        .wait(st)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                if st.phase == Phase::Ready {
                    return Entry::Ready;
                }
                debug_assert!(st.failures > seen);
                Entry::Failed(st.last_failure.clone().unwrap_or_default())
            }
        }
    }

    pub(crate) fn finish_ok(&self) {
        let mut st = self.lock();
        st.phase = Phase::Ready;
        st.last_failure = None;
        drop(st);
        self.changed.notify_all();
    }

    pub(crate) fn finish_err(&self, message: String) {
        let mut st = self.lock();
        st.phase = Phase::Uninitialized;
        st.failures += 1;
        st.last_failure = Some(message);
        drop(st);
        self.changed.notify_all();
    }
}

/// Resets the gate if the leader unwinds before finishing.
pub(crate) struct LeaderGuard<'a> {
    gate: &'a InitGate,
    done: bool,
}

impl<'a> LeaderGuard<'a> {
    pub(crate) fn new(gate: &'a InitGate) -> Self {
        Self { gate, done: false }
    }

    pub(crate) fn succeed(mut self) {
        self.done = true;
        self.gate.finish_ok();
    }

    pub(crate) fn fail(mut self, message: String) {
        self.done = true;
        self.gate.finish_err(message);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.gate.finish_err("initialization aborted".to_string());
        }
    }
}
