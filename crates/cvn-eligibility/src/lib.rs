//! cvn-eligibility
//!
//! Role-eligibility gating for order claims. Pure deterministic logic: no
//! IO, no clock, no store access. A rejection here means the command never
//! reaches the order store at all.

use cvn_schemas::{SubscriptionStatus, UserProfile, VerificationStatus};

/// Why a claim was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    VerificationRequired,
    SubscriptionExpired,
}

impl RejectReason {
    /// User-facing message for the refusal notification.
    pub fn message(&self) -> &'static str {
        match self {
            Self::VerificationRequired => "Verification is required before claiming orders",
            Self::SubscriptionExpired => "Your subscription has expired. Renew it to continue",
        }
    }
}

/// Outcome of the claim gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDecision {
    Allow,
    Reject(RejectReason),
}

impl ClaimDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Evaluate whether the executor profile may claim orders.
///
/// Verification is checked first; anything short of Approved refuses.
/// Subscription refuses only on the explicit Expired state — an overdue
/// trial is still a trial until a command changes it.
pub fn check_claim(executor: &UserProfile) -> ClaimDecision {
    if executor.verification != VerificationStatus::Approved {
        return ClaimDecision::Reject(RejectReason::VerificationRequired);
    }
    if matches!(executor.subscription, SubscriptionStatus::Expired { .. }) {
        return ClaimDecision::Reject(RejectReason::SubscriptionExpired);
    }
    ClaimDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cvn_schemas::{supported_cities, Role};
    use uuid::Uuid;

    fn executor(verification: VerificationStatus, subscription: SubscriptionStatus) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            phone: "+77001234567".to_string(),
            role: Role::Executor,
            selected_city: supported_cities().remove(0),
            display_name: "Executor 4567".to_string(),
            verification,
            subscription,
        }
    }

    #[test]
    fn approved_active_executor_is_allowed() {
        let profile = executor(VerificationStatus::Approved, SubscriptionStatus::Active);
        assert_eq!(check_claim(&profile), ClaimDecision::Allow);
    }

    #[test]
    fn approved_executor_on_trial_is_allowed() {
        let profile = executor(
            VerificationStatus::Approved,
            SubscriptionStatus::Trial {
                started_at: Utc::now(),
                window_hours: 48,
            },
        );
        assert_eq!(check_claim(&profile), ClaimDecision::Allow);
    }

    #[test]
    fn anything_short_of_approved_verification_refuses() {
        for verification in [
            VerificationStatus::NotSubmitted,
            VerificationStatus::Pending,
            VerificationStatus::Rejected {
                reason: "Rejected by moderator Aigerim".to_string(),
            },
        ] {
            let profile = executor(verification, SubscriptionStatus::Active);
            assert_eq!(
                check_claim(&profile),
                ClaimDecision::Reject(RejectReason::VerificationRequired)
            );
        }
    }

    #[test]
    fn expired_subscription_refuses() {
        let profile = executor(
            VerificationStatus::Approved,
            SubscriptionStatus::Expired {
                expired_at: Utc::now(),
            },
        );
        assert_eq!(
            check_claim(&profile),
            ClaimDecision::Reject(RejectReason::SubscriptionExpired)
        );
    }

    #[test]
    fn verification_is_checked_before_subscription() {
        let profile = executor(
            VerificationStatus::NotSubmitted,
            SubscriptionStatus::Expired {
                expired_at: Utc::now(),
            },
        );
        assert_eq!(
            check_claim(&profile),
            ClaimDecision::Reject(RejectReason::VerificationRequired)
        );
    }
}
