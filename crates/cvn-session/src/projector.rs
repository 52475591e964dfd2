//! The state projector: one sequential subscription across every store.
//!
//! All upstream change notifications are merged into a single stream, so
//! exactly one recompute loop runs regardless of how many slices changed.
//! Each recomputation reads every slice fresh at that moment and publishes
//! one [`AppSnapshot`] — a subscriber can never observe a mix of stale and
//! fresh slices. Back-to-back upstream emissions may coalesce into a single
//! recomputation; the published snapshot is current either way.

use cvn_profiles::RegistryState;
use cvn_schemas::{City, Order, Role, UiEvent, VerificationRequest, VerificationStatus};
use cvn_status::StatusState;
use futures_util::{stream::select_all, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

use crate::session::SessionLocal;
use crate::snapshot::{AdminView, AppSnapshot, ClientView, ExecutorView, ModeratorView};

/// Static inputs the projector needs besides the live slices.
pub(crate) struct ProjectorContext {
    pub catalog: Vec<City>,
    pub moderator_name: String,
}

/// Read handles onto every upstream slice.
pub(crate) struct ProjectorInputs {
    pub registry: watch::Receiver<RegistryState>,
    pub orders: watch::Receiver<Vec<Order>>,
    pub queue: watch::Receiver<Vec<VerificationRequest>>,
    pub status: watch::Receiver<StatusState>,
    pub local: watch::Receiver<SessionLocal>,
    pub event: watch::Receiver<Option<UiEvent>>,
}

impl ProjectorInputs {
    fn read_all(
        &self,
    ) -> (
        RegistryState,
        Vec<Order>,
        Vec<VerificationRequest>,
        StatusState,
        SessionLocal,
        Option<UiEvent>,
    ) {
        (
            self.registry.borrow().clone(),
            self.orders.borrow().clone(),
            self.queue.borrow().clone(),
            self.status.borrow().clone(),
            self.local.borrow().clone(),
            self.event.borrow().clone(),
        )
    }
}

/// Spawn the projector loop. It publishes into `out` until either side of
/// the pipeline goes away (all stores dropped, or all snapshot readers
/// dropped), then exits.
pub(crate) fn spawn(
    ctx: ProjectorContext,
    inputs: ProjectorInputs,
    out: watch::Sender<AppSnapshot>,
) -> JoinHandle<()> {
    // One merged change stream = one sequential subscription. The streams
    // only signal; values are read fresh from the receivers at recompute
    // time.
    let mut changes = select_all(vec![
        WatchStream::from_changes(inputs.registry.clone())
            .map(|_| ())
            .boxed(),
        WatchStream::from_changes(inputs.orders.clone())
            .map(|_| ())
            .boxed(),
        WatchStream::from_changes(inputs.queue.clone())
            .map(|_| ())
            .boxed(),
        WatchStream::from_changes(inputs.status.clone())
            .map(|_| ())
            .boxed(),
        WatchStream::from_changes(inputs.local.clone())
            .map(|_| ())
            .boxed(),
        WatchStream::from_changes(inputs.event.clone())
            .map(|_| ())
            .boxed(),
    ]);

    tokio::spawn(async move {
        loop {
            let (registry, orders, queue, status, local, event) = inputs.read_all();
            let snapshot = compose(&ctx, &registry, &orders, &queue, &status, &local, event);
            if out.send(snapshot).is_err() {
                break;
            }
            if changes.next().await.is_none() {
                break;
            }
        }
        tracing::debug!("projector loop ended");
    })
}

/// Pure recomputation of the consolidated snapshot from fresh slice values.
pub(crate) fn compose(
    ctx: &ProjectorContext,
    registry: &RegistryState,
    orders: &[Order],
    queue: &[VerificationRequest],
    status: &StatusState,
    local: &SessionLocal,
    event: Option<UiEvent>,
) -> AppSnapshot {
    let executor = registry.profiles.get(&Role::Executor);

    let assigned_orders: Vec<Order> = match executor {
        Some(profile) => orders
            .iter()
            .filter(|o| o.executor_name.as_deref() == Some(profile.display_name.as_str()))
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    let available_orders: Vec<Order> = orders
        .iter()
        .filter(|o| {
            o.status == cvn_schemas::OrderStatus::Pending
                || executor.is_some_and(|profile| {
                    o.executor_name.as_deref() == Some(profile.display_name.as_str())
                        && !o.status.is_terminal()
                })
        })
        .cloned()
        .collect();

    AppSnapshot {
        phone: registry.phone.clone(),
        selected_city: registry.city.clone(),
        available_cities: ctx.catalog.clone(),
        selected_role: local.selected_role,
        onboarding_complete: registry.phone.is_some() && registry.city.is_some(),
        client: ClientView {
            profile: registry.profiles.get(&Role::Client).cloned(),
            orders: orders.to_vec(),
            last_created_order_id: local.last_created_order_id,
        },
        executor: ExecutorView {
            verification: executor
                .map(|p| p.verification.clone())
                .unwrap_or(VerificationStatus::NotSubmitted),
            subscription: executor.map(|p| p.subscription.clone()),
            profile: executor.cloned(),
            available_orders,
            assigned_orders,
            last_submitted_request_id: local.last_submitted_request_id,
        },
        moderator: ModeratorView {
            moderator_name: ctx.moderator_name.clone(),
            pending_requests: queue.to_vec(),
        },
        admin: AdminView {
            safe_mode_enabled: status.safe_mode,
            banners: status.banners.clone(),
        },
        event,
    }
}
