use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond time source used to stamp and evaluate task expiry.
///
/// The pool only ever asks "what time is it now"; injecting the trait lets
/// tests drive expiry without sleeping.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock provider backed by `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_ms() -> i64 {
    SystemClock.now_ms()
}
