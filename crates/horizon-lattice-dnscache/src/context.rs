//! Cancellation and deadline scoping for lookups.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{DnsCacheError, Result};

/// Scope of a single lookup: a cancellation token and an optional deadline.
///
/// Only the wait on the resolution backend is bounded by the context. A
/// context that ends never touches entries that are already cached.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use horizon_lattice_dnscache::LookupContext;
///
/// let ctx = LookupContext::with_timeout(Duration::from_secs(2));
/// let addrs = resolver.lookup_host(&ctx, "example.com").await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct LookupContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl LookupContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::background().deadline(deadline)
    }

    /// A context that ends when `token` is cancelled.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set the deadline, keeping the earlier one if a deadline is already set.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Get the deadline, if any.
    pub fn get_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Get the cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check whether the context has already ended.
    pub fn err(&self) -> Option<DnsCacheError> {
        if self.token.is_cancelled() {
            Some(DnsCacheError::Cancelled)
        } else if self.deadline.is_some_and(|d| d <= Instant::now()) {
            Some(DnsCacheError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Drive `fut` until it completes or the context ends.
    ///
    /// When the context ends first, `fut` is dropped and the matching
    /// cancellation error is returned.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;

            () = self.token.cancelled() => Err(DnsCacheError::Cancelled),
            () = deadline => Err(DnsCacheError::DeadlineExceeded),
            value = fut => Ok(value),
        }
    }
}
