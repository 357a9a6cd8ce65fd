//! The persisted user profile - generation points, membership, onboarding.
//!
//! Same persistence idiom as the gallery: one whole-object JSON blob,
//! best-effort writes. The daily point refill runs on load and whenever the
//! host asks, keyed on the UTC day of the last refresh.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::FlowResult;

/// File name of the persisted profile blob.
const PROFILE_FILE: &str = "profile.json";

/// Points a freemium account refills to each day.
pub const DAILY_POINTS: u32 = 5;

/// Milliseconds per UTC day.
const DAY_MS: u64 = 86_400_000;

/// Membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    /// Daily-refilled free tier.
    #[default]
    Freemium,
    /// Purchased-points tier.
    Premium,
}

/// The user's persisted profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Remaining generation points.
    pub points: u32,
    /// Current membership tier.
    pub membership: Membership,
    /// When the daily refill last ran, milliseconds since epoch.
    pub last_points_refresh_at: u64,
    /// Whether the onboarding gate has been completed.
    pub onboarding_seen: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            points: DAILY_POINTS,
            membership: Membership::Freemium,
            last_points_refresh_at: now_ms(),
            onboarding_seen: false,
        }
    }
}

/// Thread-safe profile storage with optional JSON persistence.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profile: Arc<RwLock<Profile>>,
    data_dir: Option<PathBuf>,
}

impl ProfileStore {
    /// Create an in-memory profile store with the default profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profile store persisted under `data_dir`, loading any
    /// existing blob and running the daily refill check (the original
    /// hydration behavior).
    ///
    /// # Errors
    ///
    /// Returns [`crate::FlowError::Io`] if the directory cannot be created,
    /// or [`crate::FlowError::Serialization`] if an existing blob is corrupt.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> FlowResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let path = data_dir.join(PROFILE_FILE);
        let profile = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Profile::default()
        };

        let store = Self {
            profile: Arc::new(RwLock::new(profile)),
            data_dir: Some(data_dir),
        };
        store.refresh_daily_points_at(now_ms());
        store.sync_membership();
        Ok(store)
    }

    /// A snapshot of the current profile.
    #[must_use]
    pub fn get(&self) -> Profile {
        self.profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run the daily refill check against the current clock.
    pub fn refresh_daily_points(&self) {
        self.refresh_daily_points_at(now_ms());
    }

    /// Daily refill rules, keyed on the UTC day of `now_ms`:
    /// nothing happens twice on one day; freemium accounts below
    /// [`DAILY_POINTS`] refill to it; premium accounts below it refill
    /// *and* drop back to freemium; everyone else just has the day marked.
    pub fn refresh_daily_points_at(&self, now_ms: u64) {
        let mut profile = self
            .profile
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if profile.last_points_refresh_at / DAY_MS == now_ms / DAY_MS {
            return;
        }

        if profile.points < DAILY_POINTS {
            profile.points = DAILY_POINTS;
            if profile.membership == Membership::Premium {
                profile.membership = Membership::Freemium;
            }
        }
        profile.last_points_refresh_at = now_ms;
        drop(profile);
        self.persist();
    }

    /// Recompute the membership tier from the point balance: more points
    /// than the daily refill means premium.
    pub fn sync_membership(&self) {
        {
            let mut profile = self
                .profile
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            profile.membership = if profile.points > DAILY_POINTS {
                Membership::Premium
            } else {
                Membership::Freemium
            };
        }
        self.persist();
    }

    /// Spend one generation point. Returns `false` (and changes nothing)
    /// when the balance is empty.
    #[must_use = "a refused spend means the balance is empty"]
    pub fn spend_point(&self) -> bool {
        let spent = {
            let mut profile = self
                .profile
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if profile.points == 0 {
                false
            } else {
                profile.points -= 1;
                true
            }
        };
        if spent {
            self.persist();
        }
        spent
    }

    /// Add purchased points and re-sync the membership tier.
    pub fn add_points(&self, amount: u32) {
        {
            let mut profile = self
                .profile
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            profile.points = profile.points.saturating_add(amount);
        }
        self.sync_membership();
    }

    /// Record that the onboarding gate was completed.
    pub fn mark_onboarding_seen(&self) {
        {
            let mut profile = self
                .profile
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            profile.onboarding_seen = true;
        }
        self.persist();
    }

    /// Reset to the default profile.
    pub fn reset(&self) {
        {
            let mut profile = self
                .profile
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *profile = Profile::default();
        }
        self.persist();
    }

    /// Write the profile as one JSON blob. Best-effort.
    fn persist(&self) {
        let Some(ref data_dir) = self.data_dir else {
            return;
        };
        let profile = self.get();
        let json = match serde_json::to_string_pretty(&profile) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("failed to serialize profile: {e}");
                return;
            }
        };
        let path = data_dir.join(PROFILE_FILE);
        if let Err(e) = std::fs::write(&path, json) {
            tracing::warn!("failed to persist profile to {}: {e}", path.display());
        }
    }
}

/// Current Unix timestamp in milliseconds.
fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(points: u32, membership: Membership, last_refresh: u64) -> ProfileStore {
        let store = ProfileStore::new();
        {
            let mut profile = store.profile.write().expect("lock");
            profile.points = points;
            profile.membership = membership;
            profile.last_points_refresh_at = last_refresh;
        }
        store
    }

    #[test]
    fn test_default_profile() {
        let profile = ProfileStore::new().get();
        assert_eq!(profile.points, DAILY_POINTS);
        assert_eq!(profile.membership, Membership::Freemium);
        assert!(!profile.onboarding_seen);
    }

    #[test]
    fn test_refill_skipped_same_day() {
        let store = store_with(2, Membership::Freemium, 10 * DAY_MS + 100);
        store.refresh_daily_points_at(10 * DAY_MS + 50_000);
        assert_eq!(store.get().points, 2);
    }

    #[test]
    fn test_freemium_refills_next_day() {
        let store = store_with(2, Membership::Freemium, 10 * DAY_MS);
        store.refresh_daily_points_at(11 * DAY_MS + 1);
        let profile = store.get();
        assert_eq!(profile.points, DAILY_POINTS);
        assert_eq!(profile.last_points_refresh_at, 11 * DAY_MS + 1);
    }

    #[test]
    fn test_freemium_above_threshold_only_marks_day() {
        let store = store_with(7, Membership::Freemium, 10 * DAY_MS);
        store.refresh_daily_points_at(11 * DAY_MS);
        let profile = store.get();
        assert_eq!(profile.points, 7);
        assert_eq!(profile.last_points_refresh_at, 11 * DAY_MS);
    }

    #[test]
    fn test_premium_below_threshold_refills_and_downgrades() {
        let store = store_with(1, Membership::Premium, 10 * DAY_MS);
        store.refresh_daily_points_at(11 * DAY_MS);
        let profile = store.get();
        assert_eq!(profile.points, DAILY_POINTS);
        assert_eq!(profile.membership, Membership::Freemium);
    }

    #[test]
    fn test_premium_above_threshold_keeps_points() {
        let store = store_with(20, Membership::Premium, 10 * DAY_MS);
        store.refresh_daily_points_at(11 * DAY_MS);
        let profile = store.get();
        assert_eq!(profile.points, 20);
        assert_eq!(profile.membership, Membership::Premium);
    }

    #[test]
    fn test_sync_membership_threshold() {
        let store = store_with(6, Membership::Freemium, 0);
        store.sync_membership();
        assert_eq!(store.get().membership, Membership::Premium);

        let store = store_with(5, Membership::Premium, 0);
        store.sync_membership();
        assert_eq!(store.get().membership, Membership::Freemium);
    }

    #[test]
    fn test_spend_point() {
        let store = store_with(1, Membership::Freemium, 0);
        assert!(store.spend_point());
        assert_eq!(store.get().points, 0);
        assert!(!store.spend_point());
    }

    #[test]
    fn test_add_points_promotes() {
        let store = store_with(5, Membership::Freemium, 0);
        store.add_points(10);
        let profile = store.get();
        assert_eq!(profile.points, 15);
        assert_eq!(profile.membership, Membership::Premium);
    }

    #[test]
    fn test_onboarding_flag() {
        let store = ProfileStore::new();
        store.mark_onboarding_seen();
        assert!(store.get().onboarding_seen);
        store.reset();
        assert!(!store.get().onboarding_seen);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = ProfileStore::with_data_dir(dir.path()).expect("store");
            assert!(store.spend_point());
            store.mark_onboarding_seen();
        }

        let restored = ProfileStore::with_data_dir(dir.path()).expect("restored");
        let profile = restored.get();
        assert_eq!(profile.points, DAILY_POINTS - 1);
        assert!(profile.onboarding_seen);
    }
}
