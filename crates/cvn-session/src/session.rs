//! The session: command surface + owned stores + projector wiring.
//!
//! Commands validate eligibility, mutate exactly one store slice at a time,
//! and surface outcomes as transient events. Nothing here is fallible to the
//! caller: a command either fully applies or leaves state unchanged and
//! reports why through the next snapshot.

use chrono::Utc;
use cvn_eligibility::{check_claim, ClaimDecision};
use cvn_moderation::VerificationQueue;
use cvn_orders::OrderStore;
use cvn_profiles::ProfileRegistry;
use cvn_schemas::{
    supported_cities, OrderDraft, Role, SubscriptionStatus, UiEvent, VerificationStatus,
};
use cvn_state::StateCell;
use cvn_status::StatusBoard;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::projector::{self, ProjectorContext, ProjectorInputs};
use crate::snapshot::AppSnapshot;

/// Session-local slice: the active role and the "most recent" cursors the
/// projections expose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct SessionLocal {
    pub selected_role: Option<Role>,
    pub last_created_order_id: Option<Uuid>,
    pub last_submitted_request_id: Option<Uuid>,
}

/// One in-memory marketplace session.
///
/// Owns every store; each store remains the sole mutator of its own
/// collection. Must be created inside a Tokio runtime — the projector runs
/// as a background task and dies with the session.
pub struct Session {
    config: SessionConfig,
    registry: ProfileRegistry,
    orders: OrderStore,
    moderation: VerificationQueue,
    status: StatusBoard,
    local: StateCell<SessionLocal>,
    events: StateCell<Option<UiEvent>>,
    snapshot_rx: watch::Receiver<AppSnapshot>,
    _projector: JoinHandle<()>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let registry = ProfileRegistry::new(
            supported_cities(),
            config.trial_window_hours,
            config.phone_placeholder.clone(),
        );
        let orders = OrderStore::new();
        if config.seed_demo_orders {
            orders.seed_demo(registry.catalog());
        }
        let moderation = VerificationQueue::new();
        let status = StatusBoard::new();
        let local: StateCell<SessionLocal> = StateCell::default();
        let events: StateCell<Option<UiEvent>> = StateCell::default();

        let ctx = ProjectorContext {
            catalog: registry.catalog().to_vec(),
            moderator_name: config.moderator_name.clone(),
        };
        // Late subscribers must see a correct value immediately, so the
        // first snapshot is composed synchronously before the loop starts.
        let initial = projector::compose(
            &ctx,
            &registry.state(),
            &orders.orders(),
            &moderation.pending(),
            &status.current(),
            &local.get(),
            events.get(),
        );
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let inputs = ProjectorInputs {
            registry: registry.subscribe(),
            orders: orders.subscribe(),
            queue: moderation.subscribe(),
            status: status.subscribe(),
            local: local.subscribe(),
            event: events.subscribe(),
        };
        let projector = projector::spawn(ctx, inputs, snapshot_tx);

        Self {
            config,
            registry,
            orders,
            moderation,
            status,
            local,
            events,
            snapshot_rx,
            _projector: projector,
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot surface
    // -----------------------------------------------------------------------

    /// Clone of the latest published snapshot.
    pub fn snapshot(&self) -> AppSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// New snapshot subscriber with immediate-current-value delivery.
    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Direct store access, for embedders and tests that need to arrange
    /// state the command surface does not cover.
    pub fn profiles(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn order_store(&self) -> &OrderStore {
        &self.orders
    }

    pub fn moderation(&self) -> &VerificationQueue {
        &self.moderation
    }

    pub fn status_board(&self) -> &StatusBoard {
        &self.status
    }

    // -----------------------------------------------------------------------
    // Onboarding commands
    // -----------------------------------------------------------------------

    pub fn submit_phone(&self, phone: &str) {
        self.registry.set_phone(phone);
    }

    pub fn select_city(&self, code: &str) {
        let city = self.registry.set_city_code(code);
        tracing::debug!(code, resolved = %city.code, "city selected");
    }

    pub fn select_role(&self, role: Role) {
        self.registry.ensure(role);
        self.local.mutate(|local| local.selected_role = Some(role));
    }

    // -----------------------------------------------------------------------
    // Order commands
    // -----------------------------------------------------------------------

    /// Unconditional: any client draft becomes a PENDING order.
    pub fn create_order(&self, draft: OrderDraft) {
        let client = self.registry.ensure(Role::Client);
        let order = self.orders.create(&client, draft);
        self.local.mutate(|local| {
            local.selected_role = Some(Role::Client);
            local.last_created_order_id = Some(order.id);
        });
        tracing::info!(order_id = %order.id, city = %order.city.code, "order published");
        self.push_event(UiEvent::toast(format!(
            "Order published in {}",
            client.selected_city.title
        )));
    }

    /// Gated: verification and subscription are checked before the store is
    /// touched. A refusal leaves every slice unchanged.
    pub fn claim_order(&self, order_id: Uuid) {
        let executor = self.registry.ensure(Role::Executor);
        match check_claim(&executor) {
            ClaimDecision::Reject(reason) => {
                tracing::info!(%order_id, ?reason, "claim refused by eligibility gate");
                self.push_event(UiEvent::toast(reason.message()));
            }
            ClaimDecision::Allow => match self.orders.claim(order_id, &executor) {
                Some(order) => {
                    tracing::info!(order_id = %order.id, "order claimed");
                    self.push_event(UiEvent::toast("Order is now assigned to you"));
                }
                None => {
                    tracing::info!(%order_id, "claim lost: order missing or already taken");
                    self.push_event(UiEvent::toast("Order was already taken by another executor"));
                }
            },
        }
    }

    pub fn advance_order(&self, order_id: Uuid) {
        if let Some(order) = self.orders.advance(order_id) {
            self.push_event(UiEvent::toast(format!(
                "Order status updated: {}",
                order.status.label()
            )));
        }
    }

    pub fn cancel_order(&self, order_id: Uuid) {
        if self.orders.cancel(order_id).is_some() {
            self.push_event(UiEvent::toast("Order cancelled"));
        }
    }

    // -----------------------------------------------------------------------
    // Verification commands
    // -----------------------------------------------------------------------

    /// Two sequential effects, deliberately not transactionally coupled: the
    /// profile goes Pending first, then the request enters the queue.
    pub fn submit_verification(&self, attachments: Vec<String>) {
        let executor = self.registry.ensure(Role::Executor);
        self.registry
            .set_verification(Role::Executor, VerificationStatus::Pending);
        let request = self.moderation.submit(&executor, attachments);
        self.local
            .mutate(|local| local.last_submitted_request_id = Some(request.id));
        tracing::info!(request_id = %request.id, "verification submitted");
        self.push_event(UiEvent::toast("Documents submitted for moderation"));
    }

    /// Moderator decision. The outcome is mirrored onto the executor profile
    /// only when the decided id matches the most recently submitted request.
    pub fn review_verification(&self, request_id: Uuid, approved: bool) {
        let decision =
            self.moderation
                .review(request_id, approved, &self.config.moderator_name);
        if self.local.get().last_submitted_request_id == Some(request_id) {
            self.registry
                .set_verification(Role::Executor, decision.clone());
        }
        tracing::info!(%request_id, approved, ?decision, "verification reviewed");
        self.push_event(UiEvent::toast(if approved {
            "Executor approved"
        } else {
            "Request rejected"
        }));
    }

    // -----------------------------------------------------------------------
    // Subscription commands
    // -----------------------------------------------------------------------

    pub fn activate_subscription(&self) {
        self.registry.ensure(Role::Executor);
        self.registry
            .set_subscription(Role::Executor, SubscriptionStatus::Active);
        self.push_event(UiEvent::toast("Subscription activated"));
    }

    pub fn renew_trial(&self) {
        self.registry.ensure(Role::Executor);
        self.registry.set_subscription(
            Role::Executor,
            SubscriptionStatus::Trial {
                started_at: Utc::now(),
                window_hours: self.config.trial_window_hours,
            },
        );
        self.push_event(UiEvent::toast("Trial period renewed"));
    }

    // -----------------------------------------------------------------------
    // Operational commands
    // -----------------------------------------------------------------------

    pub fn set_safe_mode(&self, enabled: bool) {
        self.status.set_safe_mode(enabled);
    }

    /// Clear the pending transient event once presentation has shown it.
    pub fn acknowledge_event(&self) {
        self.events.replace(None);
    }

    fn push_event(&self, event: UiEvent) {
        // Last write wins: an unacknowledged previous event is overwritten.
        self.events.replace(Some(event));
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
