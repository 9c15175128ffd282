//! Check request queue backed by a `tokio::sync::mpsc` channel.
//!
//! The channel is unbounded so that [`CheckQueue::schedule_check`] never
//! blocks or fails on a slow scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uptime_core::scheduler::CheckScheduler;
use uptime_core::types::DbId;

// ---------------------------------------------------------------------------
// CheckRequest
// ---------------------------------------------------------------------------

/// Ask the scheduler to start probing a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub service_id: DbId,

    /// When the request was issued (UTC).
    pub requested_at: DateTime<Utc>,
}

impl CheckRequest {
    pub fn new(service_id: DbId) -> Self {
        Self {
            service_id,
            requested_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// CheckQueue
// ---------------------------------------------------------------------------

/// Sending half of the check request channel.
///
/// Cloneable; every clone feeds the same [`CheckReceiver`].
///
/// # Usage
///
/// ```rust
/// use uptime_core::scheduler::CheckScheduler;
/// use uptime_events::CheckQueue;
///
/// let (queue, mut rx) = CheckQueue::channel();
/// queue.schedule_check(7);
///
/// assert_eq!(rx.try_recv().map(|r| r.service_id), Some(7));
/// ```
#[derive(Clone)]
pub struct CheckQueue {
    sender: mpsc::UnboundedSender<CheckRequest>,
}

impl CheckQueue {
    /// Create a connected queue / receiver pair.
    pub fn channel() -> (Self, CheckReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, CheckReceiver { receiver })
    }

    /// Send a request. Returns `false` if the receiver is gone.
    pub fn send(&self, request: CheckRequest) -> bool {
        self.sender.send(request).is_ok()
    }
}

impl CheckScheduler for CheckQueue {
    fn schedule_check(&self, service_id: DbId) {
        if !self.send(CheckRequest::new(service_id)) {
            tracing::warn!(service_id, "Check scheduler is not running; request dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// CheckReceiver
// ---------------------------------------------------------------------------

/// Receiving half of the check request channel.
pub struct CheckReceiver {
    receiver: mpsc::UnboundedReceiver<CheckRequest>,
}

impl CheckReceiver {
    /// Wait for the next request. `None` once every [`CheckQueue`] is dropped.
    pub async fn recv(&mut self) -> Option<CheckRequest> {
        self.receiver.recv().await
    }

    /// Take a pending request without waiting.
    pub fn try_recv(&mut self) -> Option<CheckRequest> {
        self.receiver.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schedule_check_delivers_request() {
        let (queue, mut rx) = CheckQueue::channel();

        queue.schedule_check(42);

        let received = rx.recv().await.expect("should receive the request");
        assert_eq!(received.service_id, 42);
    }

    #[tokio::test]
    async fn clones_share_one_receiver() {
        let (queue, mut rx) = CheckQueue::channel();
        let other = queue.clone();

        queue.schedule_check(1);
        other.schedule_check(2);

        assert_eq!(rx.recv().await.map(|r| r.service_id), Some(1));
        assert_eq!(rx.recv().await.map(|r| r.service_id), Some(2));
    }

    #[tokio::test]
    async fn receiver_ends_when_all_queues_dropped() {
        let (queue, mut rx) = CheckQueue::channel();
        queue.schedule_check(5);
        drop(queue);

        assert_eq!(rx.recv().await.map(|r| r.service_id), Some(5));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn schedule_without_receiver_does_not_panic() {
        let (queue, rx) = CheckQueue::channel();
        drop(rx);

        queue.schedule_check(9);
        assert!(!queue.send(CheckRequest::new(9)));
    }

    #[test]
    fn try_recv_on_empty_queue_is_none() {
        let (_queue, mut rx) = CheckQueue::channel();
        assert!(rx.try_recv().is_none());
    }
}
