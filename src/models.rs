use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Reference Data ---

/// Every blood group the network tracks, in display order.
pub const BLOOD_GROUPS: [BloodGroup; 8] = [
    BloodGroup::APositive,
    BloodGroup::ANegative,
    BloodGroup::BPositive,
    BloodGroup::BNegative,
    BloodGroup::AbPositive,
    BloodGroup::AbNegative,
    BloodGroup::OPositive,
    BloodGroup::ONegative,
];

/// Service locations. The first entry doubles as the default location of a new session.
pub const LOCATIONS: [&str; 9] = [
    "Tirupati",
    "Vijayawada",
    "Guntur",
    "Nellore",
    "Kurnool",
    "Visakhapatnam",
    "Rajahmundry",
    "Anantapur",
    "Kadapa",
];

// --- Identity ---

/// Role
///
/// The fixed set of identity categories. The serialized form (`admin`, `bloodBank`, ...)
/// is wire-visible: it is what lands in the durable session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Role {
    Admin,
    BloodBank,
    Seeker,
    Donor,
    Guest,
}

impl Role {
    /// Wire name of the role, identical to its serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::BloodBank => "bloodBank",
            Role::Seeker => "seeker",
            Role::Donor => "donor",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BloodGroup
///
/// ABO/Rh group. Serialized with its clinical notation ("A+", "AB-", ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[ts(export)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BloodGroup {
    type Err = crate::error::AppError;

    /// Case-insensitive. A trailing space after the letters reads as `+`, since an
    /// unencoded `+` in a query string decodes to a space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let wanted = match s.strip_suffix(' ') {
            Some(_) if !trimmed.ends_with(['+', '-']) => format!("{trimmed}+"),
            _ => trimmed.to_string(),
        };
        BLOOD_GROUPS
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| crate::error::AppError::UnknownBloodGroup(s.to_string()))
    }
}

/// Session
///
/// The currently signed-in identity. This is exactly the flat record persisted in the
/// durable slot, so field names follow the camelCase wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    /// Opaque per-login identifier. Not a credential.
    pub id: String,
    /// Capitalized local part of the email.
    pub name: String,
    pub email: String,
    pub role: Role,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub blood_group: Option<BloodGroup>,
}

// --- Catalog Schemas ---

/// BloodBank
///
/// A blood bank in the directory, with its current stock per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BloodBank {
    pub id: String,
    pub name: String,
    pub location: String,
    pub contact: String,
    pub inventory: BTreeMap<BloodGroup, u32>,
    pub verified: bool,
}

/// Donor
///
/// A registered voluntary donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Donor {
    pub id: String,
    pub name: String,
    pub blood_group: BloodGroup,
    pub location: String,
    #[ts(type = "string | null")]
    pub last_donation_date: Option<NaiveDate>,
    pub is_available: bool,
    pub contact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RequestStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Urgency {
    Critical,
    Normal,
}

/// BloodRequest
///
/// A seeker's request for a number of units of one blood group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BloodRequest {
    pub id: String,
    pub seeker_id: String,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub location: String,
    pub hospital: String,
    pub status: RequestStatus,
    pub urgency: Urgency,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AlertKind {
    Emergency,
    Update,
}

/// Alert
///
/// Network-wide notice shown on the admin dashboard (e.g. a critical shortage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
    pub location: String,
}

/// DonationRecord
///
/// One line of a donor's donation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DonationRecord {
    pub location: String,
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub units: u32,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for POST /login. The role is taken at face value; there is no
/// credential check behind it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    /// Empty falls back to the demo account address.
    #[serde(default)]
    #[schema(example = "nurse@example.com")]
    pub email: String,
    pub role: Role,
}

/// InventoryAdjustment
///
/// Input payload for PATCH /dashboard/inventory/{group}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct InventoryAdjustment {
    /// Signed change in units; the resulting stock never drops below zero.
    pub delta: i32,
}

/// AvailabilityUpdate
///
/// Input payload for PUT /dashboard/availability.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AvailabilityUpdate {
    pub available: bool,
}

// --- Page Schemas (Output) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Feature {
    pub title: String,
    pub description: String,
}

/// HomePage
///
/// Data behind `/`: the pitch, the feature list and whoever is signed in.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HomePage {
    pub name: String,
    pub tagline: String,
    pub features: Vec<Feature>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RoleOption {
    pub label: String,
    pub value: Role,
}

/// LoginForm
///
/// Data behind GET /login: the roles a visitor can pick from.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginForm {
    pub roles: Vec<RoleOption>,
    pub default_role: Role,
}

/// AdminDashboardStats
///
/// Aggregate counters over the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_banks: u32,
    pub verified_banks: u32,
    pub active_donors: u32,
    pub pending_requests: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminDashboard {
    pub stats: AdminDashboardStats,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BloodBankDashboard {
    pub inventory: BTreeMap<BloodGroup, u32>,
    pub nearby_donors: Vec<Donor>,
    pub pending_requests: Vec<BloodRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SeekerDashboard {
    pub active_requests: Vec<BloodRequest>,
    pub nearby_banks: Vec<BloodBank>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DonorDashboard {
    pub blood_group: Option<BloodGroup>,
    pub total_donations: u32,
    pub available: bool,
    pub history: Vec<DonationRecord>,
}

/// DashboardContent
///
/// The role-specific half of the dashboard, tagged with the role it was built for.
/// Guests have none.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "role", rename_all = "camelCase")]
#[ts(export)]
pub enum DashboardContent {
    Admin(AdminDashboard),
    BloodBank(BloodBankDashboard),
    Seeker(SeekerDashboard),
    Donor(DonorDashboard),
}

/// DashboardPage
///
/// Data behind GET /dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardPage {
    pub session: Session,
    pub content: Option<DashboardContent>,
}

/// InventoryView
///
/// The managed inventory after a read or an adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct InventoryView {
    pub inventory: BTreeMap<BloodGroup, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_group_parses_wire_names() {
        assert_eq!("O-".parse::<BloodGroup>().unwrap(), BloodGroup::ONegative);
        assert_eq!("ab+".parse::<BloodGroup>().unwrap(), BloodGroup::AbPositive);
        assert_eq!(" B- ".parse::<BloodGroup>().unwrap(), BloodGroup::BNegative);
    }

    #[test]
    fn blood_group_reads_trailing_space_as_plus() {
        assert_eq!("A ".parse::<BloodGroup>().unwrap(), BloodGroup::APositive);
        assert_eq!("AB ".parse::<BloodGroup>().unwrap(), BloodGroup::AbPositive);
        assert_eq!("O- ".parse::<BloodGroup>().unwrap(), BloodGroup::ONegative);
    }

    #[test]
    fn blood_group_rejects_bare_letters_and_unknown_names() {
        assert!("A".parse::<BloodGroup>().is_err());
        assert!("C+".parse::<BloodGroup>().is_err());
        assert!(" ".parse::<BloodGroup>().is_err());
    }
}
