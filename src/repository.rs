use crate::models::{
    AdminDashboardStats, Alert, AlertKind, BLOOD_GROUPS, BloodBank, BloodGroup, BloodRequest,
    DonationRecord, Donor, LOCATIONS, RequestStatus, Urgency,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

/// BloodRepository Trait
///
/// Read access to the blood-bank catalog plus the two pieces of mutable dashboard
/// state (managed inventory, donor availability). Handlers depend only on this trait.
///
/// **Send + Sync + async_trait** make `Arc<dyn BloodRepository>` shareable across
/// Axum's task boundaries.
#[async_trait]
pub trait BloodRepository: Send + Sync {
    // --- Directory ---
    // Empty filters match everything.
    async fn list_blood_banks(
        &self,
        location: Option<String>,
        group: Option<BloodGroup>,
    ) -> Vec<BloodBank>;
    async fn list_donors(&self) -> Vec<Donor>;
    async fn list_requests(&self) -> Vec<BloodRequest>;

    // --- Blood Bank Dashboard ---
    async fn inventory(&self) -> BTreeMap<BloodGroup, u32>;
    // Saturates at zero; returns the whole inventory after the change.
    async fn adjust_inventory(&self, group: BloodGroup, delta: i32) -> BTreeMap<BloodGroup, u32>;

    // --- Donor Dashboard ---
    // Keyed by session id; a donor starts out available.
    async fn donor_availability(&self, session_id: &str) -> bool;
    async fn set_donor_availability(&self, session_id: &str, available: bool) -> bool;
    async fn donation_history(&self, email: &str) -> Vec<DonationRecord>;

    // --- Admin ---
    async fn get_stats(&self) -> AdminDashboardStats;
    async fn alerts(&self) -> Vec<Alert>;
}

/// RepositoryState
///
/// The concrete type used to share the catalog across the application state.
pub type RepositoryState = Arc<dyn BloodRepository>;

/// Stock the blood-bank dashboard starts from.
pub fn starting_inventory() -> BTreeMap<BloodGroup, u32> {
    use BloodGroup::*;
    BTreeMap::from([
        (APositive, 12),
        (ANegative, 4),
        (BPositive, 18),
        (BNegative, 2),
        (AbPositive, 8),
        (AbNegative, 1),
        (OPositive, 25),
        (ONegative, 5),
    ])
}

/// matches_filter
///
/// Location must match exactly; a group filter keeps banks holding at least one unit.
pub fn matches_filter(bank: &BloodBank, location: Option<&str>, group: Option<BloodGroup>) -> bool {
    let location_ok = location.is_none_or(|loc| bank.location == loc);
    let group_ok = group.is_none_or(|g| bank.inventory.get(&g).copied().unwrap_or(0) > 0);
    location_ok && group_ok
}

/// Catalog
///
/// The generated directory data. Regenerated on every start; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub banks: Vec<BloodBank>,
    pub donors: Vec<Donor>,
    pub requests: Vec<BloodRequest>,
}

impl Catalog {
    const BANK_COUNT: usize = 20;
    const DONOR_COUNT: usize = 20;
    const REQUEST_COUNT: usize = 10;

    /// generate
    ///
    /// Builds the mock directory. Names, contacts and statuses follow the index; stock,
    /// donor availability and request group/units/location are drawn from `rng`.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let last_donation = NaiveDate::from_ymd_opt(2023, 10, 12);

        let banks = (0..Self::BANK_COUNT)
            .map(|i| {
                let location = LOCATIONS[i % LOCATIONS.len()];
                BloodBank {
                    id: format!("bb-{i}"),
                    name: format!("{location} Red Cross Society"),
                    location: location.to_string(),
                    contact: format!("+91 99887766{i:02}"),
                    inventory: BLOOD_GROUPS
                        .iter()
                        .map(|&group| (group, rng.random_range(0..50)))
                        .collect(),
                    verified: i % 3 != 0,
                }
            })
            .collect();

        let donors = (0..Self::DONOR_COUNT)
            .map(|i| Donor {
                id: format!("dn-{i}"),
                name: format!("Donor {}", i + 1),
                blood_group: BLOOD_GROUPS[i % BLOOD_GROUPS.len()],
                location: LOCATIONS[i % LOCATIONS.len()].to_string(),
                last_donation_date: last_donation,
                is_available: rng.random_bool(0.7),
                contact: format!("+91 88776655{i:02}"),
            })
            .collect();

        let created_at = Utc::now();
        let requests = (0..Self::REQUEST_COUNT)
            .map(|i| BloodRequest {
                id: format!("req-{i}"),
                seeker_id: format!("seeker-{i}"),
                blood_group: BLOOD_GROUPS[rng.random_range(0..BLOOD_GROUPS.len())],
                units: rng.random_range(1..=5),
                location: LOCATIONS[rng.random_range(0..LOCATIONS.len())].to_string(),
                hospital: "City General Hospital".to_string(),
                status: if i % 4 == 0 {
                    RequestStatus::Fulfilled
                } else {
                    RequestStatus::Pending
                },
                urgency: if i % 3 == 0 {
                    Urgency::Critical
                } else {
                    Urgency::Normal
                },
                created_at,
            })
            .collect();

        Self {
            banks,
            donors,
            requests,
        }
    }
}

/// InMemoryRepository
///
/// The `BloodRepository` used by the service and the tests: a generated `Catalog`
/// plus mutex-guarded dashboard state.
pub struct InMemoryRepository {
    catalog: Catalog,
    inventory: Mutex<BTreeMap<BloodGroup, u32>>,
    availability: Mutex<HashMap<String, bool>>,
}

impl InMemoryRepository {
    /// Catalog drawn from the thread-local RNG.
    pub fn new() -> Self {
        Self::from_catalog(Catalog::generate(&mut rand::rng()))
    }

    /// Reproducible catalog for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_catalog(Catalog::generate(&mut StdRng::seed_from_u64(seed)))
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            inventory: Mutex::new(starting_inventory()),
            availability: Mutex::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BloodRepository for InMemoryRepository {
    async fn list_blood_banks(
        &self,
        location: Option<String>,
        group: Option<BloodGroup>,
    ) -> Vec<BloodBank> {
        self.catalog
            .banks
            .iter()
            .filter(|bank| matches_filter(bank, location.as_deref(), group))
            .cloned()
            .collect()
    }

    async fn list_donors(&self) -> Vec<Donor> {
        self.catalog.donors.clone()
    }

    async fn list_requests(&self) -> Vec<BloodRequest> {
        self.catalog.requests.clone()
    }

    async fn inventory(&self) -> BTreeMap<BloodGroup, u32> {
        self.inventory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn adjust_inventory(&self, group: BloodGroup, delta: i32) -> BTreeMap<BloodGroup, u32> {
        let mut inventory = self.inventory.lock().unwrap_or_else(PoisonError::into_inner);
        let stock = inventory.entry(group).or_insert(0);
        *stock = stock.saturating_add_signed(delta);
        tracing::debug!(%group, delta, stock = *stock, "inventory adjusted");
        inventory.clone()
    }

    async fn donor_availability(&self, session_id: &str) -> bool {
        self.availability
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .copied()
            .unwrap_or(true)
    }

    async fn set_donor_availability(&self, session_id: &str, available: bool) -> bool {
        self.availability
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.to_string(), available);
        available
    }

    async fn donation_history(&self, _email: &str) -> Vec<DonationRecord> {
        [("Tirupati Hospital", (2023, 10, 12)), ("Red Cross Guntur", (2023, 6, 5))]
            .into_iter()
            .filter_map(|(location, (y, m, d))| {
                Some(DonationRecord {
                    location: location.to_string(),
                    date: NaiveDate::from_ymd_opt(y, m, d)?,
                    units: 1,
                })
            })
            .collect()
    }

    async fn get_stats(&self) -> AdminDashboardStats {
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        AdminDashboardStats {
            total_banks: count(self.catalog.banks.len()),
            verified_banks: count(self.catalog.banks.iter().filter(|b| b.verified).count()),
            active_donors: count(self.catalog.donors.iter().filter(|d| d.is_available).count()),
            pending_requests: count(
                self.catalog
                    .requests
                    .iter()
                    .filter(|r| r.status == RequestStatus::Pending)
                    .count(),
            ),
        }
    }

    async fn alerts(&self) -> Vec<Alert> {
        vec![Alert {
            id: "alert-o-neg-vizag".to_string(),
            kind: AlertKind::Emergency,
            message: "O- Negative units are critically low in the Visakhapatnam region."
                .to_string(),
            timestamp: Utc::now(),
            location: "Visakhapatnam".to_string(),
        }]
    }
}
