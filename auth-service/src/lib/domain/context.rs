use std::time::Duration;

use tokio::time::Instant;

/// Per-call deadline supplied by the caller of an auth operation.
///
/// Every store round-trip made on behalf of the call is bounded by the
/// earlier of this deadline and the service's own store timeout. Dropping the
/// operation's future cancels whatever call is in flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context without a caller deadline; only the store timeout applies.
    pub fn background() -> Self {
        Self { deadline: None }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Instant by which a call started now must finish, given a per-call `limit`.
    pub fn deadline_within(&self, limit: Duration) -> Instant {
        let bound = Instant::now() + limit;
        match self.deadline {
            Some(deadline) => deadline.min(bound),
            None => bound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_uses_limit() {
        let before = Instant::now();
        let deadline = RequestContext::background().deadline_within(Duration::from_secs(5));

        assert!(deadline >= before + Duration::from_secs(5));
    }

    #[test]
    fn test_caller_deadline_wins_when_earlier() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(10));
        let deadline = ctx.deadline_within(Duration::from_secs(60));

        assert_eq!(Some(deadline), ctx.deadline());
    }

    #[test]
    fn test_limit_wins_when_earlier() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(60));
        let deadline = ctx.deadline_within(Duration::from_millis(10));

        assert!(Some(deadline) < ctx.deadline());
    }
}
