//! Late-result protection for views that start asynchronous work.
//!
//! A view holds a [`FetchGuard`] and takes a [`FetchTicket`] before awaiting.
//! Closing the guard when the view goes away makes every outstanding ticket
//! stale, so its result is dropped instead of applied.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Clone, Default)]
pub struct FetchGuard {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct FetchTicket {
    issued: u64,
    generation: Arc<AtomicU64>,
}

const CLOSED: u64 = u64::MAX;

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for the current generation. Tickets taken after [`close`]
    /// are stale from the start.
    ///
    /// [`close`]: FetchGuard::close
    pub fn ticket(&self) -> FetchTicket {
        FetchTicket {
            issued: self.generation.load(Ordering::Acquire),
            generation: Arc::clone(&self.generation),
        }
    }

    /// Stale every ticket permanently.
    pub fn close(&self) {
        self.generation.store(CLOSED, Ordering::Release);
    }
}

impl FetchTicket {
    pub fn is_current(&self) -> bool {
        self.issued != CLOSED && self.generation.load(Ordering::Acquire) == self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_stay_current_while_open() {
        let guard = FetchGuard::new();
        let first = guard.ticket();
        let second = guard.ticket();
        assert!(first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn closing_stales_everything() {
        let guard = FetchGuard::new();
        let ticket = guard.ticket();
        guard.close();
        assert!(!ticket.is_current());
        assert!(!guard.ticket().is_current());
    }
}
