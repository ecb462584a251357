//! Order serial allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use tee_studio_core::OrderSerial;

/// Issues order serials that never repeat within a process.
///
/// Each serial encodes a microsecond timestamp. When two requests land in the
/// same microsecond (or the clock steps backwards) the timestamp is bumped past
/// the last one issued, so serials stay strictly increasing.
#[derive(Debug, Default)]
pub struct SerialGenerator {
    last_micros: AtomicU64,
}

impl SerialGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_micros: AtomicU64::new(0),
        }
    }

    /// Issue the next serial.
    pub fn issue(&self) -> OrderSerial {
        let now = u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0);
        self.issue_at(now)
    }

    fn issue_at(&self, now_micros: u64) -> OrderSerial {
        let bump = |last: u64| now_micros.max(last.saturating_add(1));

        // The closure always returns `Some`, so both arms carry the previous value.
        let previous = match self
            .last_micros
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(bump(last)))
        {
            Ok(prev) | Err(prev) => prev,
        };
        let micros = bump(previous);

        OrderSerial::from_parts(
            micros / OrderSerial::SUFFIX_RANGE,
            micros % OrderSerial::SUFFIX_RANGE,
        )
    }
}
