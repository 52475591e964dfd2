//! cvn-profiles
//!
//! Session identity plus one provisioned profile per role. Provisioning is
//! idempotent, and every phone/city change — whether set directly or picked
//! up during a lookup — fans out to ALL existing profiles, so no profile
//! ever holds a stale copy of the session identity.

use std::collections::BTreeMap;

use chrono::Utc;
use cvn_schemas::{City, Role, SubscriptionStatus, UserProfile, VerificationStatus};
use cvn_state::StateCell;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

/// The published registry value: session identity + per-role profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    pub phone: Option<String>,
    pub city: Option<City>,
    pub profiles: BTreeMap<Role, UserProfile>,
}

/// Provisions and keeps in sync one identity per role per session.
#[derive(Debug)]
pub struct ProfileRegistry {
    cell: StateCell<RegistryState>,
    catalog: Vec<City>,
    trial_window_hours: i64,
    phone_placeholder: String,
}

impl ProfileRegistry {
    pub fn new(catalog: Vec<City>, trial_window_hours: i64, phone_placeholder: String) -> Self {
        Self {
            cell: StateCell::default(),
            catalog,
            trial_window_hours,
            phone_placeholder,
        }
    }

    pub fn state(&self) -> RegistryState {
        self.cell.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<RegistryState> {
        self.cell.subscribe()
    }

    pub fn catalog(&self) -> &[City] {
        &self.catalog
    }

    pub fn get(&self, role: Role) -> Option<UserProfile> {
        self.cell.get().profiles.get(&role).cloned()
    }

    // -----------------------------------------------------------------------
    // Session identity
    // -----------------------------------------------------------------------

    /// Record the session phone and refresh it on all existing profiles.
    pub fn set_phone(&self, phone: &str) {
        let phone = phone.to_string();
        self.cell.mutate_if(move |state| {
            let before = state.clone();
            state.phone = Some(phone.clone());
            for profile in state.profiles.values_mut() {
                profile.phone = phone.clone();
            }
            (*state != before, ())
        });
    }

    /// Resolve a city code against the catalog (unknown codes fall back to
    /// the first entry), record it, and refresh all existing profiles.
    pub fn set_city_code(&self, code: &str) -> City {
        let city = self.resolve_city(Some(code));
        let applied = city.clone();
        self.cell.mutate_if(move |state| {
            let before = state.clone();
            state.city = Some(city.clone());
            for profile in state.profiles.values_mut() {
                profile.selected_city = city.clone();
            }
            (*state != before, ())
        });
        applied
    }

    // -----------------------------------------------------------------------
    // Provisioning
    // -----------------------------------------------------------------------

    /// Return the session's profile for `role`, creating it on first call.
    ///
    /// Creation defaults: deterministic display name (role label plus the
    /// last 4 phone digits for client/executor, a static label otherwise);
    /// executors start NotSubmitted with a fresh trial window, everyone else
    /// starts pre-approved and active. Every lookup also refreshes phone and
    /// city on ALL existing profiles from the current session values.
    pub fn ensure(&self, role: Role) -> UserProfile {
        let placeholder = self.phone_placeholder.clone();
        let fallback_city = self.resolve_city(None);
        let trial_window_hours = self.trial_window_hours;

        self.cell.mutate_if(move |state| {
            let before = state.clone();
            let phone = state.phone.clone().unwrap_or(placeholder);
            let city = state.city.clone().unwrap_or(fallback_city);

            for profile in state.profiles.values_mut() {
                profile.phone = phone.clone();
                profile.selected_city = city.clone();
            }

            let profile = state
                .profiles
                .entry(role)
                .or_insert_with(|| {
                    tracing::debug!(?role, "profile provisioned");
                    new_profile(role, phone, city, trial_window_hours)
                })
                .clone();
            (*state != before, profile)
        })
    }

    // -----------------------------------------------------------------------
    // Decision outcomes
    // -----------------------------------------------------------------------

    /// Record a verification outcome on the role's profile, if provisioned.
    pub fn set_verification(&self, role: Role, status: VerificationStatus) {
        self.cell.mutate_if(move |state| match state.profiles.get_mut(&role) {
            Some(profile) if profile.verification != status => {
                profile.verification = status;
                (true, ())
            }
            _ => (false, ()),
        });
    }

    /// Record a subscription change on the role's profile, if provisioned.
    pub fn set_subscription(&self, role: Role, status: SubscriptionStatus) {
        self.cell.mutate_if(move |state| match state.profiles.get_mut(&role) {
            Some(profile) if profile.subscription != status => {
                profile.subscription = status;
                (true, ())
            }
            _ => (false, ()),
        });
    }

    fn resolve_city(&self, code: Option<&str>) -> City {
        code.and_then(|c| self.catalog.iter().find(|city| city.code == c))
            .or_else(|| self.catalog.first())
            .cloned()
            .unwrap_or_else(|| City::new("", ""))
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new(cvn_schemas::supported_cities(), 48, "+7".to_string())
    }
}

fn new_profile(role: Role, phone: String, city: City, trial_window_hours: i64) -> UserProfile {
    let display_name = match role {
        Role::Client | Role::Executor => format!("{} {}", role.label(), last_digits(&phone, 4)),
        Role::Moderator | Role::Admin => role.label().to_string(),
    };
    let (verification, subscription) = match role {
        Role::Executor => (
            VerificationStatus::NotSubmitted,
            SubscriptionStatus::Trial {
                started_at: Utc::now(),
                window_hours: trial_window_hours,
            },
        ),
        _ => (VerificationStatus::Approved, SubscriptionStatus::Active),
    };
    UserProfile {
        id: Uuid::new_v4(),
        phone,
        role,
        selected_city: city,
        display_name,
        verification,
        subscription,
    }
}

fn last_digits(phone: &str, n: usize) -> String {
    let chars: Vec<char> = phone.chars().collect();
    chars[chars.len().saturating_sub(n)..].iter().collect()
}
