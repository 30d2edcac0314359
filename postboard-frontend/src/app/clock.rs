use std::sync::Arc;

use crate::get_timestamp;

/// Millisecond clock. Injected so expiry can be driven by hand in tests.
#[derive(Clone)]
pub struct Clock {
    ticker: Arc<dyn Fn() -> u128 + Sync + Send + 'static>,
}

impl Clock {
    pub fn new<F: Fn() -> u128 + Send + Sync + 'static>(ticker: F) -> Self {
        Self {
            ticker: Arc::new(ticker),
        }
    }

    pub fn system() -> Self {
        Self::new(|| get_timestamp().as_millis())
    }

    pub fn now(&self) -> u128 {
        (self.ticker)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock").field("now", &self.now()).finish()
    }
}

#[cfg(test)]
mod clock_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::Clock;
    use test_log::test;

    #[test]
    fn test_clock() {
        let time = Arc::new(AtomicU64::new(5));
        let clock = Clock::new({
            let time = time.clone();
            move || time.load(Ordering::SeqCst) as u128
        });
        assert_eq!(clock.now(), 5);
        time.store(3005, Ordering::SeqCst);
        assert_eq!(clock.now(), 3005);

        assert!(Clock::system().now() > 0);
    }
}
