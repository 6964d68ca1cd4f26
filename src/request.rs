//! Single-slot supervision of a screen's outstanding request.
//!
//! A screen owns one [`RequestSlot`]. Its loading indicator is exactly
//! [`RequestSlot::is_pending`]. Every started request gets a [`Ticket`]
//! carrying a fresh [`RequestId`] and a cancellation token; results are only
//! accepted for the id currently in the slot.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What happens when a request is started while another is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPolicy {
    /// Cancel the outstanding request and start the new one.
    #[default]
    Supersede,
    /// Keep the outstanding request and refuse the new one.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// Handed to the command performing the request.
#[derive(Debug, Clone)]
pub struct Ticket {
    id: RequestId,
    token: CancellationToken,
}

impl Ticket {
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Resolves once the slot gave up on this request.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct InFlight {
    id: RequestId,
    token: CancellationToken,
}

#[derive(Debug)]
pub struct RequestSlot {
    policy: RequestPolicy,
    next_id: u64,
    in_flight: Option<InFlight>,
}

impl RequestSlot {
    pub fn new(policy: RequestPolicy) -> Self {
        Self {
            policy,
            next_id: 0,
            in_flight: None,
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a request. Returns `None` when the policy refuses it.
    pub fn begin(&mut self) -> Option<Ticket> {
        if let Some(current) = &self.in_flight {
            match self.policy {
                RequestPolicy::Reject => {
                    debug!(id = current.id.0, "request already in flight, rejecting new one");
                    return None;
                }
                RequestPolicy::Supersede => {
                    debug!(id = current.id.0, "superseding in-flight request");
                    current.token.cancel();
                }
            }
        }

        self.next_id += 1;
        let id = RequestId(self.next_id);
        let token = CancellationToken::new();
        self.in_flight = Some(InFlight {
            id,
            token: token.clone(),
        });
        Some(Ticket { id, token })
    }

    /// Close the slot for `id`. Returns `false` if `id` is not the current
    /// request, in which case its result must be dropped.
    pub fn finish(&mut self, id: RequestId) -> bool {
        match &self.in_flight {
            Some(current) if current.id == id => {
                self.in_flight = None;
                true
            }
            _ => {
                debug!(id = id.0, "discarding result of stale request");
                false
            }
        }
    }

    /// Abandon the outstanding request, if any.
    pub fn cancel(&mut self) {
        if let Some(current) = self.in_flight.take() {
            current.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_between_begin_and_finish() {
        let mut slot = RequestSlot::new(RequestPolicy::Supersede);
        assert!(!slot.is_pending());

        let ticket = slot.begin().unwrap();
        assert!(slot.is_pending());

        assert!(slot.finish(ticket.id()));
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_supersede_cancels_previous() {
        let mut slot = RequestSlot::new(RequestPolicy::Supersede);
        let first = slot.begin().unwrap();
        let second = slot.begin().unwrap();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_ne!(first.id(), second.id());

        // Late result of the first request is ignored and keeps the slot busy
        assert!(!slot.finish(first.id()));
        assert!(slot.is_pending());
        assert!(slot.finish(second.id()));
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_reject_keeps_current() {
        let mut slot = RequestSlot::new(RequestPolicy::Reject);
        let first = slot.begin().unwrap();
        assert!(slot.begin().is_none());
        assert!(!first.is_cancelled());
        assert!(slot.finish(first.id()));

        // Free again
        assert!(slot.begin().is_some());
    }

    #[test]
    fn test_cancel_clears_slot() {
        let mut slot = RequestSlot::new(RequestPolicy::Supersede);
        let ticket = slot.begin().unwrap();
        slot.cancel();

        assert!(ticket.is_cancelled());
        assert!(!slot.is_pending());
        assert!(!slot.finish(ticket.id()));
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let mut slot = RequestSlot::new(RequestPolicy::Supersede);
        let ticket = slot.begin().unwrap();
        slot.cancel();
        ticket.cancelled().await;
    }

    #[test]
    fn test_policy_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: RequestPolicy,
        }
        let parsed: Wrapper = toml::from_str(r#"policy = "reject""#).unwrap();
        assert_eq!(parsed.policy, RequestPolicy::Reject);
    }
}
