use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_timer::Delay;

use crate::page::Page;

/// Runs only the last call made within the wait window.
#[derive(Clone)]
pub struct Debouncer {
    page: Arc<dyn Page>,
    wait: Duration,
    ticket: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(page: Arc<dyn Page>, wait: Duration) -> Self {
        Self {
            page,
            wait,
            ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn call(&self, f: impl FnOnce() + Send + 'static) {
        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = self.ticket.clone();
        let wait = self.wait;
        self.page.spawn(Box::pin(async move {
            Delay::new(wait).await;
            if latest.load(Ordering::SeqCst) == ticket {
                f();
            }
        }));
    }
}

/// Runs the first call of a window and drops the rest until it closes.
#[derive(Clone)]
pub struct Throttle {
    page: Arc<dyn Page>,
    limit: Duration,
    closed: Arc<AtomicBool>,
}

impl Throttle {
    pub fn new(page: Arc<dyn Page>, limit: Duration) -> Self {
        Self {
            page,
            limit,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns whether `f` ran.
    pub fn call(&self, f: impl FnOnce()) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        f();
        let closed = self.closed.clone();
        let limit = self.limit;
        self.page.spawn(Box::pin(async move {
            Delay::new(limit).await;
            closed.store(false, Ordering::SeqCst);
        }));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;
    use std::sync::Mutex;

    #[test]
    fn debouncer_keeps_only_latest_call() {
        let page = Arc::new(MemoryPage::default());
        let debouncer = Debouncer::new(page.clone(), Duration::ZERO);
        let seen = Arc::new(Mutex::new(Vec::new()));

        for value in 1..=3 {
            let seen = seen.clone();
            debouncer.call(move || seen.lock().expect("seen lock").push(value));
        }
        page.run_until_idle();

        assert_eq!(*seen.lock().expect("seen lock"), vec![3]);
    }

    #[test]
    fn throttle_drops_calls_inside_window() {
        let page = Arc::new(MemoryPage::default());
        let throttle = Throttle::new(page.clone(), Duration::ZERO);
        let mut runs = 0;

        assert!(throttle.call(|| runs += 1));
        assert!(!throttle.call(|| runs += 1));
        page.run_until_idle();
        assert!(throttle.call(|| runs += 1));

        assert_eq!(runs, 2);
    }
}
