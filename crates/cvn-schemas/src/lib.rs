//! cvn-schemas
//!
//! Shared entity/value model for the caravan marketplace core. Plain data,
//! no behavior beyond the order lifecycle transition table, which lives next
//! to [`OrderStatus`] so every consumer (stores, projections, tests) goes
//! through the same table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The four session roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Executor,
    Moderator,
    Admin,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Executor => "Executor",
            Role::Moderator => "Moderator",
            Role::Admin => "Administrator",
        }
    }
}

// ---------------------------------------------------------------------------
// City catalog
// ---------------------------------------------------------------------------

/// An entry in the static city catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Unique short code, e.g. "ala".
    pub code: String,
    pub title: String,
}

impl City {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
        }
    }
}

/// The fixed city catalog, seeded once at startup. The first entry doubles
/// as the fallback when no city has been selected yet.
pub fn supported_cities() -> Vec<City> {
    vec![
        City::new("ala", "Almaty"),
        City::new("ast", "Astana"),
        City::new("shy", "Shymkent"),
        City::new("akt", "Aktobe"),
    ]
}

// ---------------------------------------------------------------------------
// Order lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Taxi,
    Delivery,
}

/// All valid states an order can occupy.
///
/// The lifecycle is a single fixed path with one escape hatch:
///
/// ```text
///   PENDING ──► CLAIMED ──► IN_PROGRESS ──► COMPLETED (term.)
///      │            │            │
///      └────────────┴────────────┴────────► CANCELLED (term.)
/// ```
///
/// Terminal states have no outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Claimed,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The next status along the fixed path. Terminal states return
    /// themselves — advancing a finished order is a no-op, not an error.
    pub fn advanced(&self) -> OrderStatus {
        match self {
            Self::Pending => Self::Claimed,
            Self::Claimed => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::Completed,
            Self::Cancelled => Self::Cancelled,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Claimed => "CLAIMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// A delivery/taxi order. Never physically removed — cancellation is a
/// terminal status, not deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub kind: OrderKind,
    pub city: City,
    pub pickup_address: String,
    pub drop_off_address: Option<String>,
    /// Offered price, positive integer in the local currency.
    pub budget: u32,
    pub note: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub client_name: String,
    /// Set exactly once, by the claiming executor.
    pub executor_name: Option<String>,
}

/// Client-supplied fields for a new order; everything else is derived from
/// the creating profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub kind: OrderKind,
    pub pickup: String,
    pub drop_off: Option<String>,
    pub budget: u32,
    pub note: String,
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationStatus {
    NotSubmitted,
    Pending,
    Approved,
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Grace period an executor may operate in without a paid subscription.
    Trial {
        started_at: DateTime<Utc>,
        window_hours: i64,
    },
    Active,
    Expired { expired_at: DateTime<Utc> },
}

/// One identity per role per session. Never deleted in-session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub phone: String,
    pub role: Role,
    pub selected_city: City,
    pub display_name: String,
    pub verification: VerificationStatus,
    pub subscription: SubscriptionStatus,
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

/// A pending identity-verification request. Attachments are opaque
/// identifiers; their content is never inspected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub id: Uuid,
    pub executor_name: String,
    pub phone: String,
    pub submitted_at: DateTime<Utc>,
    pub city: City,
    pub attachments: Vec<String>,
}

// ---------------------------------------------------------------------------
// Operational status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BannerSeverity {
    Info,
    Warning,
    Critical,
}

/// A global status banner. At most one is held per severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationBanner {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: BannerSeverity,
}

impl NotificationBanner {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: BannerSeverity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

// ---------------------------------------------------------------------------
// Transient events
// ---------------------------------------------------------------------------

/// A transient, single-delivery notification. Cleared once acknowledged;
/// last write wins when a new one arrives before acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Toast { message: String },
}

impl UiEvent {
    pub fn toast(message: impl Into<String>) -> Self {
        Self::Toast {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Toast { message } => message,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
