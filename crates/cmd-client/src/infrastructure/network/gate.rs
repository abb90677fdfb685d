//! Mutual-exclusion gate guarding the shared command stream.
//!
//! # Why a separate gate? (for beginners)
//!
//! A frame goes out as five separate write+flush pairs.  If two threads sent
//! at the same time, their segments could interleave on the wire and the
//! server would read garbage.  The gate is a binary semaphore: a sender
//! acquires it before the first write and releases it after the last one, so
//! only one frame is in flight per client.
//!
//! The gate is a trait so tests can substitute a mock and assert that every
//! acquire is paired with exactly one release, including when a write fails.
//!
//! # Scoped release
//!
//! Callers never call [`Gate::release`] by hand.  [`GateGuard::acquire`]
//! returns a guard whose `Drop` releases the gate, so an early `return`, a
//! `?`, or a panic unwinding through the sender all release it exactly once.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::warn;

/// Binary mutual-exclusion primitive with blocking acquisition.
///
/// Contract: at most one outstanding `acquire` at a time, and every
/// `release` pairs with a prior `acquire`.
#[cfg_attr(test, mockall::automock)]
pub trait Gate: Send + Sync {
    /// Blocks until the gate is free, then takes it.  There is no timeout.
    fn acquire(&self);

    /// Frees the gate and wakes one blocked acquirer, if any.
    fn release(&self);
}

/// RAII handle that releases its gate when dropped.
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct GateGuard<'a> {
    gate: &'a dyn Gate,
}

impl<'a> GateGuard<'a> {
    /// Acquires `gate`, blocking until it is available.
    pub fn acquire(gate: &'a dyn Gate) -> Self {
        gate.acquire();
        Self { gate }
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// The default [`Gate`]: a capacity-1 semaphore built on `Mutex` + `Condvar`.
#[derive(Debug, Default)]
pub struct SemaphoreGate {
    held: Mutex<bool>,
    freed: Condvar,
}

impl SemaphoreGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while some caller holds the gate.
    ///
    /// Diagnostic only; the answer may be stale by the time it is read.
    pub fn is_held(&self) -> bool {
        *self.lock_state()
    }

    /// Takes the gate if it is free, without blocking.
    pub fn try_acquire(&self) -> bool {
        let mut held = self.lock_state();
        if *held {
            return false;
        }
        *held = true;
        true
    }

    // The state is a single flag, so a panic in another holder cannot leave
    // it half-updated; recover the guard instead of propagating poison.
    fn lock_state(&self) -> MutexGuard<'_, bool> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Gate for SemaphoreGate {
    fn acquire(&self) {
        let mut held = self.lock_state();
        while *held {
            held = self
                .freed
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *held = true;
    }

    fn release(&self) {
        let mut held = self.lock_state();
        if !*held {
            warn!("gate released without a matching acquire; ignoring");
            return;
        }
        *held = false;
        drop(held);
        self.freed.notify_one();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
