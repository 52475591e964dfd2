//! The consolidated snapshot published to presentation subscribers.
//!
//! One immutable value per emission: session identity, the four role
//! projections, and at most one pending transient event. A snapshot is
//! always internally consistent — every slice in it was read fresh during
//! the same recomputation.

use cvn_schemas::{
    City, NotificationBanner, Order, Role, SubscriptionStatus, UiEvent, UserProfile,
    VerificationRequest, VerificationStatus,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientView {
    pub profile: Option<UserProfile>,
    /// The full order collection, newest first.
    pub orders: Vec<Order>,
    pub last_created_order_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorView {
    pub profile: Option<UserProfile>,
    pub verification: VerificationStatus,
    pub subscription: Option<SubscriptionStatus>,
    /// PENDING orders anyone may claim, plus this executor's own
    /// not-yet-finished orders.
    pub available_orders: Vec<Order>,
    /// Everything ever assigned to this executor, all statuses.
    pub assigned_orders: Vec<Order>,
    pub last_submitted_request_id: Option<Uuid>,
}

impl Default for ExecutorView {
    fn default() -> Self {
        Self {
            profile: None,
            verification: VerificationStatus::NotSubmitted,
            subscription: None,
            available_orders: Vec::new(),
            assigned_orders: Vec::new(),
            last_submitted_request_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeratorView {
    pub moderator_name: String,
    pub pending_requests: Vec<VerificationRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminView {
    pub safe_mode_enabled: bool,
    pub banners: Vec<NotificationBanner>,
}

/// The complete published state consumed by presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSnapshot {
    pub phone: Option<String>,
    pub selected_city: Option<City>,
    pub available_cities: Vec<City>,
    pub selected_role: Option<Role>,
    /// Both phone and city have been provided.
    pub onboarding_complete: bool,
    pub client: ClientView,
    pub executor: ExecutorView,
    pub moderator: ModeratorView,
    pub admin: AdminView,
    /// At most one pending transient event; last write wins.
    pub event: Option<UiEvent>,
}
