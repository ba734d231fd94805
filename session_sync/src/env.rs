use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time for timestamps written to the store
pub trait Environment: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;
}

pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}
