//! cvn-moderation
//!
//! Pending identity-verification requests. A request enters the queue on
//! submission and leaves it exactly once, on decision; the decision outcome
//! is recorded on the executor's profile by the caller, not on the request.

use chrono::Utc;
use cvn_schemas::{UserProfile, VerificationRequest, VerificationStatus};
use cvn_state::StateCell;
use tokio::sync::watch;
use uuid::Uuid;

/// Owns the pending verification queue, oldest first.
#[derive(Debug, Default)]
pub struct VerificationQueue {
    cell: StateCell<Vec<VerificationRequest>>,
}

impl VerificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<VerificationRequest> {
        self.cell.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<VerificationRequest>> {
        self.cell.subscribe()
    }

    /// Append a new request for the given executor. Attachments are opaque
    /// identifiers and may be empty; nothing is validated here.
    pub fn submit(&self, executor: &UserProfile, attachments: Vec<String>) -> VerificationRequest {
        let request = VerificationRequest {
            id: Uuid::new_v4(),
            executor_name: executor.display_name.clone(),
            phone: executor.phone.clone(),
            submitted_at: Utc::now(),
            city: executor.selected_city.clone(),
            attachments,
        };
        tracing::debug!(request_id = %request.id, "verification request submitted");

        let submitted = request.clone();
        self.cell.mutate(move |queue| queue.push(request));
        submitted
    }

    /// Decide a request: remove it from the queue and return the resulting
    /// verification status, naming the deciding moderator on rejection.
    ///
    /// An unknown id (never submitted, or already decided) leaves the queue
    /// unchanged and returns a generic rejection — deliberately the same
    /// result shape as a moderator rejection.
    pub fn review(
        &self,
        request_id: Uuid,
        approved: bool,
        moderator_name: &str,
    ) -> VerificationStatus {
        let found = self
            .cell
            .mutate_if(move |queue| match queue.iter().position(|r| r.id == request_id) {
                Some(at) => (true, Some(queue.remove(at))),
                None => (false, None),
            });

        match found {
            Some(request) => {
                let decision = if approved {
                    VerificationStatus::Approved
                } else {
                    VerificationStatus::Rejected {
                        reason: format!("Rejected by moderator {moderator_name}"),
                    }
                };
                tracing::debug!(
                    request_id = %request.id,
                    approved,
                    "verification request decided"
                );
                decision
            }
            None => VerificationStatus::Rejected {
                reason: "Request not found".to_string(),
            },
        }
    }
}
