//! Opportunistic cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{PrimitiveError, PrimitiveResult};

/// A shareable cancellation flag.
///
/// Long-running operations accept an optional `&Canceller` and call
/// [`check`](Canceller::check) at safe points (between attributes,
/// between passes). Work already done is discarded; the operation
/// returns [`PrimitiveError::Cancelled`].
#[derive(Debug, Default)]
pub struct Canceller {
    cancelled: AtomicBool,
}

impl Canceller {
    /// Create a canceller in the not-cancelled state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Error out if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`PrimitiveError::Cancelled`] after [`cancel`](Canceller::cancel).
    pub fn check(&self) -> PrimitiveResult<()> {
        if self.is_cancelled() {
            Err(PrimitiveError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Check an optional canceller.
///
/// # Errors
///
/// Returns [`PrimitiveError::Cancelled`] if a canceller is present and
/// cancelled.
pub fn check_cancelled(canceller: Option<&Canceller>) -> PrimitiveResult<()> {
    canceller.map_or(Ok(()), Canceller::check)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flips_state() {
        let canceller = Canceller::new();
        assert!(canceller.check().is_ok());
        canceller.cancel();
        assert!(canceller.is_cancelled());
        assert!(canceller.check().is_err());
        assert!(check_cancelled(Some(&canceller)).is_err());
        assert!(check_cancelled(None).is_ok());
    }
}
