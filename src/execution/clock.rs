//! Clock port - injected time source

use chrono::{DateTime, Utc};

/// Time source for duration computation and result timestamps
///
/// Implementations must not go backward within one run.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
