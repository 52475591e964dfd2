//! The consolidated snapshot: identity fields, per-role derived views,
//! late-subscriber delivery, and transient event semantics.

use cvn_schemas::{OrderDraft, OrderKind, OrderStatus, Role, UiEvent};
use cvn_testkit::{
    approved_executor, bare_session, init_tracing, onboard, wait_for, wait_for_toast,
};

fn draft(budget: u32) -> OrderDraft {
    OrderDraft {
        kind: OrderKind::Delivery,
        pickup: "pickup".to_string(),
        drop_off: None,
        budget,
        note: String::new(),
    }
}

#[tokio::test]
async fn onboarding_completes_when_both_phone_and_city_are_set() {
    init_tracing();
    let session = bare_session();

    assert!(!session.snapshot().onboarding_complete);
    assert_eq!(session.snapshot().available_cities.len(), 4);

    session.submit_phone("+77001234567");
    let snap = wait_for(&session, |s| s.phone.is_some()).await;
    assert!(!snap.onboarding_complete, "phone alone is not enough");

    session.select_city("ast");
    let snap = wait_for(&session, |s| s.onboarding_complete).await;
    assert_eq!(snap.selected_city.as_ref().map(|c| c.code.as_str()), Some("ast"));
}

#[tokio::test]
async fn role_selection_is_reflected_with_a_provisioned_profile() {
    init_tracing();
    let session = bare_session();
    onboard(&session, "+77001234567", "ala");

    session.select_role(Role::Executor);
    let snap = wait_for(&session, |s| s.selected_role == Some(Role::Executor)).await;
    let profile = snap.executor.profile.expect("profile provisioned on selection");
    assert_eq!(profile.display_name, "Executor 4567");
}

#[tokio::test]
async fn executor_views_partition_orders_correctly() {
    init_tracing();
    let session = bare_session();
    onboard(&session, "+77001234567", "ala");
    approved_executor(&session);

    // Three orders: one stays pending, one gets claimed, one gets claimed
    // and completed.
    for budget in [100, 200, 300] {
        session.create_order(draft(budget));
    }
    let snap = wait_for(&session, |s| s.client.orders.len() == 3).await;
    let claimed_id = snap.client.orders[0].id;
    let completed_id = snap.client.orders[1].id;

    session.claim_order(claimed_id);
    wait_for(&session, |s| {
        s.client.orders.iter().any(|o| o.status == OrderStatus::Claimed)
    })
    .await;
    session.claim_order(completed_id);
    for _ in 0..2 {
        session.advance_order(completed_id);
    }
    let snap = wait_for(&session, |s| {
        s.client
            .orders
            .iter()
            .any(|o| o.status == OrderStatus::Completed)
    })
    .await;

    // available = every PENDING order + own unfinished orders.
    let available: Vec<_> = snap.executor.available_orders.iter().map(|o| o.id).collect();
    assert!(available.contains(&claimed_id), "own claimed order stays available");
    assert!(
        !available.contains(&completed_id),
        "finished orders drop out of the available view"
    );
    assert_eq!(
        snap.executor
            .available_orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
        1
    );

    // assigned = everything ever claimed by this executor, all statuses.
    let assigned: Vec<_> = snap.executor.assigned_orders.iter().map(|o| o.id).collect();
    assert!(assigned.contains(&claimed_id));
    assert!(assigned.contains(&completed_id));
}

#[tokio::test]
async fn late_subscribers_get_the_current_value_immediately() {
    init_tracing();
    let session = bare_session();
    onboard(&session, "+77001234567", "ala");
    session.create_order(draft(500));
    wait_for(&session, |s| !s.client.orders.is_empty()).await;

    // Subscribe only now: no replay, just the current value.
    let rx = session.subscribe();
    let snap = rx.borrow().clone();
    assert_eq!(snap.client.orders.len(), 1);
    assert!(snap.onboarding_complete);
}

#[tokio::test]
async fn transient_events_are_last_write_wins_until_acknowledged() {
    init_tracing();
    let session = bare_session();
    onboard(&session, "+77001234567", "ala");

    session.create_order(draft(100));
    wait_for(&session, |s| s.event.is_some()).await;

    // A second event lands before the first is acknowledged: only the
    // latest survives.
    session.activate_subscription();
    let snap = wait_for_toast(&session, "Subscription activated").await;
    assert_eq!(
        snap.event,
        Some(UiEvent::toast("Subscription activated")),
        "earlier unacknowledged event is gone"
    );

    session.acknowledge_event();
    let snap = wait_for(&session, |s| s.event.is_none()).await;
    assert_eq!(snap.event, None);
}

#[tokio::test]
async fn snapshots_serialize_for_presentation_consumers() {
    init_tracing();
    let session = bare_session();
    onboard(&session, "+77001234567", "ala");
    session.create_order(draft(100));
    let snap = wait_for(&session, |s| !s.client.orders.is_empty()).await;

    let json = serde_json::to_value(&snap).expect("snapshot serializes");
    assert_eq!(json["client"]["orders"][0]["status"], "PENDING");
    assert_eq!(json["selected_city"]["code"], "ala");
}
