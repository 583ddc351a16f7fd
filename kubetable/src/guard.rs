//! Isolation for caller-supplied closures.
//!
//! Column accessors and value extractors are written by page authors and run
//! once per row. A panic in one of them must only affect the offending cell,
//! so every call goes through [`isolate`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run `f`, converting a panic into `None` and logging it against `owner`
/// (a column key or table identity).
pub fn isolate<R>(owner: &str, what: &str, f: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            log::warn!(
                "{} of '{}' panicked: {}",
                what,
                owner,
                panic_message(&*payload)
            );
            None
        }
    }
}

/// Extract a human-readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
