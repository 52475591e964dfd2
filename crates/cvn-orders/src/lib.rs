//! cvn-orders
//!
//! The order store: sole owner and sole mutator of the session's order
//! collection. Every mutation replaces the whole collection value through a
//! [`StateCell`], so concurrent readers never see a partial update.
//!
//! Failure semantics: every failure is "not found / not eligible", returned
//! as `None`, never fatal. The caller decides messaging. The lifecycle
//! transition table itself lives on `OrderStatus` in `cvn-schemas`; this
//! store only applies it.

use chrono::{Duration, Utc};
use cvn_schemas::{City, Order, OrderDraft, OrderKind, OrderStatus, UserProfile};
use cvn_state::StateCell;
use tokio::sync::watch;
use uuid::Uuid;

/// Owns the order collection. Orders are held newest-first.
#[derive(Debug, Default)]
pub struct OrderStore {
    cell: StateCell<Vec<Order>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the current collection, newest first.
    pub fn orders(&self) -> Vec<Order> {
        self.cell.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Order>> {
        self.cell.subscribe()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Create a new PENDING order from the client's draft. Always succeeds;
    /// city and client name come from the creating profile.
    pub fn create(&self, profile: &UserProfile, draft: OrderDraft) -> Order {
        let order = Order {
            id: Uuid::new_v4(),
            kind: draft.kind,
            city: profile.selected_city.clone(),
            pickup_address: draft.pickup,
            drop_off_address: draft.drop_off,
            budget: draft.budget,
            note: draft.note,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            client_name: profile.display_name.clone(),
            executor_name: None,
        };
        tracing::debug!(order_id = %order.id, city = %order.city.code, "order created");

        let created = order.clone();
        self.cell.mutate(move |orders| orders.insert(0, order));
        created
    }

    /// Take exclusive ownership of a PENDING order for the given executor.
    ///
    /// Returns the mutated order, or `None` when the order does not exist or
    /// is no longer PENDING — the sole signal for "already taken" and
    /// "not found" alike.
    pub fn claim(&self, order_id: Uuid, executor: &UserProfile) -> Option<Order> {
        let executor_name = executor.display_name.clone();
        let claimed = self.cell.mutate_if(move |orders| {
            match orders
                .iter_mut()
                .find(|o| o.id == order_id && o.status == OrderStatus::Pending)
            {
                Some(order) => {
                    order.status = OrderStatus::Claimed;
                    order.executor_name = Some(executor_name);
                    (true, Some(order.clone()))
                }
                None => (false, None),
            }
        });
        if let Some(order) = &claimed {
            tracing::debug!(order_id = %order.id, "order claimed");
        }
        claimed
    }

    /// Move an order one step along the fixed lifecycle path. Terminal
    /// orders are returned unchanged; `None` only when the id is unknown.
    pub fn advance(&self, order_id: Uuid) -> Option<Order> {
        self.cell
            .mutate_if(move |orders| match orders.iter_mut().find(|o| o.id == order_id) {
                Some(order) => {
                    let next = order.status.advanced();
                    let changed = next != order.status;
                    order.status = next;
                    (changed, Some(order.clone()))
                }
                None => (false, None),
            })
    }

    /// Force CANCELLED from any non-terminal status. Terminal orders are
    /// returned unchanged (a COMPLETED order is never regressed, and
    /// re-cancelling is harmless); `None` only when the id is unknown.
    pub fn cancel(&self, order_id: Uuid) -> Option<Order> {
        self.cell
            .mutate_if(move |orders| match orders.iter_mut().find(|o| o.id == order_id) {
                Some(order) => {
                    let changed = !order.status.is_terminal();
                    if changed {
                        order.status = OrderStatus::Cancelled;
                    }
                    (changed, Some(order.clone()))
                }
                None => (false, None),
            })
    }

    // -----------------------------------------------------------------------
    // Demo seed
    // -----------------------------------------------------------------------

    /// Install two sample orders so a fresh session has visible data: a
    /// PENDING delivery in the first catalog city and an already-CLAIMED
    /// taxi in the second.
    pub fn seed_demo(&self, cities: &[City]) {
        let (Some(first), Some(second)) = (cities.first(), cities.get(1)) else {
            return;
        };
        let now = Utc::now();
        let sample = vec![
            Order {
                id: Uuid::new_v4(),
                kind: OrderKind::Delivery,
                city: first.clone(),
                pickup_address: "Abay Ave 15, Kok Tau residence".to_string(),
                drop_off_address: Some("Panfilov St 100".to_string()),
                budget: 4500,
                note: "Documents, deliver before 18:00".to_string(),
                status: OrderStatus::Pending,
                created_at: now - Duration::hours(2),
                client_name: "Aigul".to_string(),
                executor_name: None,
            },
            Order {
                id: Uuid::new_v4(),
                kind: OrderKind::Taxi,
                city: second.clone(),
                pickup_address: "Astana airport".to_string(),
                drop_off_address: Some("Kabanbay Batyr Ave 21".to_string()),
                budget: 2500,
                note: "Driver with a name sign".to_string(),
                status: OrderStatus::Claimed,
                created_at: now - Duration::minutes(30),
                client_name: "Rasul".to_string(),
                executor_name: Some("Alexey".to_string()),
            },
        ];
        self.cell.replace(sample);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
