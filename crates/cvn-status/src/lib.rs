//! cvn-status
//!
//! Global operational status: the safe-mode flag plus the banner set, held
//! and published as ONE value so a subscriber can never observe the flag and
//! its banner out of sync. At most one banner exists per severity.

use cvn_schemas::{BannerSeverity, NotificationBanner};
use cvn_state::StateCell;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The published operational-status value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusState {
    pub safe_mode: bool,
    pub banners: Vec<NotificationBanner>,
}

/// Owns the global status set.
#[derive(Debug, Default)]
pub struct StatusBoard {
    cell: StateCell<StatusState>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> StatusState {
        self.cell.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusState> {
        self.cell.subscribe()
    }

    /// Toggle safe mode. Enabling publishes exactly one Critical banner
    /// describing maintenance; disabling removes it. Repeating the current
    /// state is a no-op and does not republish.
    pub fn set_safe_mode(&self, enabled: bool) {
        let already = {
            let state = self.cell.get();
            let has_critical = has_severity(&state.banners, BannerSeverity::Critical);
            state.safe_mode == enabled && has_critical == enabled
        };
        if already {
            return;
        }

        tracing::info!(enabled, "safe mode toggled");
        self.cell.mutate(|state| {
            state.safe_mode = enabled;
            if enabled {
                replace_severity(
                    &mut state.banners,
                    NotificationBanner::new(
                        "Maintenance",
                        "The service is temporarily in maintenance mode. We are on it.",
                        BannerSeverity::Critical,
                    ),
                );
            } else {
                state
                    .banners
                    .retain(|b| b.severity != BannerSeverity::Critical);
            }
        });
    }

    /// Publish a banner, replacing any existing banner of the same severity.
    pub fn publish(&self, banner: NotificationBanner) {
        self.cell
            .mutate(move |state| replace_severity(&mut state.banners, banner));
    }

    /// Remove the banner of the given severity, if present.
    pub fn clear(&self, severity: BannerSeverity) {
        self.cell.mutate_if(move |state| {
            let before = state.banners.len();
            state.banners.retain(|b| b.severity != severity);
            (state.banners.len() != before, ())
        });
    }
}

fn has_severity(banners: &[NotificationBanner], severity: BannerSeverity) -> bool {
    banners.iter().any(|b| b.severity == severity)
}

fn replace_severity(banners: &mut Vec<NotificationBanner>, banner: NotificationBanner) {
    banners.retain(|b| b.severity != banner.severity);
    banners.push(banner);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn critical_count(board: &StatusBoard) -> usize {
        board
            .current()
            .banners
            .iter()
            .filter(|b| b.severity == BannerSeverity::Critical)
            .count()
    }

    #[tokio::test]
    async fn enabling_safe_mode_twice_yields_exactly_one_critical_banner() {
        let board = StatusBoard::new();
        board.set_safe_mode(true);
        board.set_safe_mode(true);

        assert!(board.current().safe_mode);
        assert_eq!(critical_count(&board), 1);
    }

    #[tokio::test]
    async fn disabling_safe_mode_removes_the_critical_banner() {
        let board = StatusBoard::new();
        board.set_safe_mode(true);
        board.set_safe_mode(false);

        let state = board.current();
        assert!(!state.safe_mode);
        assert_eq!(critical_count(&board), 0);

        // Disabling again stays a no-op.
        board.set_safe_mode(false);
        assert_eq!(board.current(), state);
    }

    #[tokio::test]
    async fn at_most_one_banner_per_severity() {
        let board = StatusBoard::new();
        board.publish(NotificationBanner::new("a", "first", BannerSeverity::Warning));
        board.publish(NotificationBanner::new("b", "second", BannerSeverity::Warning));
        board.publish(NotificationBanner::new("c", "info", BannerSeverity::Info));

        let state = board.current();
        assert_eq!(state.banners.len(), 2);
        let warning = state
            .banners
            .iter()
            .find(|b| b.severity == BannerSeverity::Warning)
            .expect("warning banner present");
        assert_eq!(warning.message, "second", "later banner replaces earlier one");
    }

    #[tokio::test]
    async fn safe_mode_does_not_disturb_other_severities() {
        let board = StatusBoard::new();
        board.publish(NotificationBanner::new("w", "warn", BannerSeverity::Warning));
        board.set_safe_mode(true);
        board.set_safe_mode(false);

        let state = board.current();
        assert_eq!(state.banners.len(), 1);
        assert_eq!(state.banners[0].severity, BannerSeverity::Warning);
    }

    #[tokio::test]
    async fn flag_and_banner_publish_as_one_value() {
        let board = StatusBoard::new();
        let mut rx = board.subscribe();

        board.set_safe_mode(true);
        rx.changed().await.expect("board alive");
        let state = rx.borrow().clone();
        assert!(state.safe_mode);
        assert_eq!(
            state
                .banners
                .iter()
                .filter(|b| b.severity == BannerSeverity::Critical)
                .count(),
            1,
            "flag and banner must arrive in the same emission"
        );
    }
}
