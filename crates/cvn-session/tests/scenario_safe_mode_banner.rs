//! Safe mode and the global banner set, observed through the admin view.

use cvn_schemas::BannerSeverity;
use cvn_testkit::{bare_session, init_tracing, wait_for};

#[tokio::test]
async fn enabling_safe_mode_publishes_one_critical_banner() {
    init_tracing();
    let session = bare_session();

    session.set_safe_mode(true);
    session.set_safe_mode(true);

    let snap = wait_for(&session, |s| s.admin.safe_mode_enabled).await;
    let criticals: Vec<_> = snap
        .admin
        .banners
        .iter()
        .filter(|b| b.severity == BannerSeverity::Critical)
        .collect();
    assert_eq!(criticals.len(), 1, "repeat calls must not stack banners");
    assert_eq!(criticals[0].title, "Maintenance");
}

#[tokio::test]
async fn disabling_safe_mode_removes_the_banner() {
    init_tracing();
    let session = bare_session();

    session.set_safe_mode(true);
    wait_for(&session, |s| s.admin.safe_mode_enabled).await;

    session.set_safe_mode(false);
    let snap = wait_for(&session, |s| !s.admin.safe_mode_enabled).await;
    assert!(
        snap.admin
            .banners
            .iter()
            .all(|b| b.severity != BannerSeverity::Critical),
        "the maintenance banner leaves with the flag"
    );
}

#[tokio::test]
async fn all_roles_observe_the_same_status() {
    init_tracing();
    let session = bare_session();

    // Two independent subscribers stand in for two role dashboards.
    let rx_a = session.subscribe();
    let rx_b = session.subscribe();

    session.set_safe_mode(true);
    wait_for(&session, |s| s.admin.safe_mode_enabled).await;

    assert!(rx_a.borrow().admin.safe_mode_enabled);
    assert!(rx_b.borrow().admin.safe_mode_enabled);
    assert_eq!(*rx_a.borrow(), *rx_b.borrow(), "one consolidated snapshot for all");
}
