//! cvn-testkit
//!
//! Shared fixtures for the scenario tests: fresh sessions in known states
//! and a snapshot-predicate wait helper. Commands are fire-and-forget while
//! the projector runs in the background, so tests assert through
//! [`wait_for`] rather than reading a snapshot immediately after a command.

use std::time::Duration;

use cvn_schemas::{Role, SubscriptionStatus, UserProfile, VerificationStatus};
use cvn_session::{AppSnapshot, Session, SessionConfig};

/// Upper bound for any single snapshot expectation. Generous on purpose:
/// the projector usually settles within microseconds.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Install a fmt subscriber once per test binary. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

/// A session with no demo data — the usual starting point for assertions
/// about exact collection contents.
pub fn bare_session() -> Session {
    Session::new(SessionConfig {
        seed_demo_orders: false,
        ..SessionConfig::default()
    })
}

/// A session with the default config, demo orders included.
pub fn demo_session() -> Session {
    Session::new(SessionConfig::default())
}

/// Complete onboarding for the given identity.
pub fn onboard(session: &Session, phone: &str, city_code: &str) {
    session.submit_phone(phone);
    session.select_city(city_code);
}

/// Provision the executor role and mark it verification-approved, skipping
/// the moderation flow. Returns the resulting profile.
pub fn approved_executor(session: &Session) -> UserProfile {
    session.select_role(Role::Executor);
    session
        .profiles()
        .set_verification(Role::Executor, VerificationStatus::Approved);
    session
        .profiles()
        .get(Role::Executor)
        .expect("executor profile was just provisioned")
}

/// Force the executor's subscription into the explicit Expired state.
pub fn expire_subscription(session: &Session) {
    session.select_role(Role::Executor);
    session.profiles().set_subscription(
        Role::Executor,
        SubscriptionStatus::Expired {
            expired_at: chrono::Utc::now(),
        },
    );
}

/// Wait until the published snapshot satisfies `pred` and return it.
/// Panics when [`WAIT_TIMEOUT`] elapses first — a failed expectation, not an
/// error to recover from.
pub async fn wait_for(session: &Session, pred: impl Fn(&AppSnapshot) -> bool) -> AppSnapshot {
    let mut rx = session.subscribe();
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    loop {
        {
            let snapshot = rx.borrow_and_update().clone();
            if pred(&snapshot) {
                return snapshot;
            }
        }
        match tokio::time::timeout_at(deadline, rx.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => panic!("session dropped while waiting for a snapshot"),
            Err(_) => panic!("timed out waiting for a snapshot to satisfy the predicate"),
        }
    }
}

/// Convenience: wait until the pending transient event carries `message`.
pub async fn wait_for_toast(session: &Session, message: &str) -> AppSnapshot {
    wait_for(session, |snap| {
        snap.event.as_ref().is_some_and(|e| e.message() == message)
    })
    .await
}
