use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{BloodGroup, LOCATIONS, Role, Session},
    slot::{DurableSlot, SlotState},
};

/// Key of the durable slot entry holding the serialized session.
pub const DEFAULT_SESSION_KEY: &str = "rb_user";

/// Blood group assigned to every new session.
pub const DEFAULT_BLOOD_GROUP: BloodGroup = BloodGroup::OPositive;

/// display_name
///
/// Derives the display name from an email: the local part with its first letter
/// upper-cased. `"nurse@x.com"` becomes `"Nurse"`; an address without `@` is used whole.
pub fn display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Session {
    /// Builds a fresh session for `email` acting as `role`, with a new opaque id and the
    /// default location and blood group.
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: display_name(email),
            email: email.to_string(),
            role,
            location: LOCATIONS[0].to_string(),
            blood_group: Some(DEFAULT_BLOOD_GROUP),
        }
    }
}

/// SessionStore
///
/// Single source of truth for who is signed in. One instance is owned by the
/// application root and shared by reference; there is no global state.
///
/// Memory and the durable slot always agree: every mutation takes the write lock,
/// updates memory, then persists. If persisting fails the memory change is undone
/// before the lock is released, so no reader ever observes a half-applied transition.
pub struct SessionStore {
    slot: SlotState,
    key: String,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// initialize
    ///
    /// Restores the session persisted under `key`, if any. Never fails: an unreadable
    /// slot or a malformed record leaves the store empty. A malformed record is also
    /// removed so the slot matches memory again.
    pub fn initialize(slot: SlotState, key: impl Into<String>) -> Self {
        let key = key.into();

        let current = match restore(slot.as_ref(), &key) {
            Ok(Some(session)) => {
                tracing::info!(session_id = %session.id, role = %session.role, "session restored");
                Some(session)
            }
            Ok(None) => None,
            Err(AppError::MalformedSessionData(e)) => {
                tracing::warn!(key = %key, error = %e, "discarding malformed session record");
                if let Err(e) = slot.remove(&key) {
                    tracing::warn!(key = %key, error = %e, "could not clear malformed session record");
                }
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "durable slot unreadable, starting signed out");
                None
            }
        };

        Self {
            slot,
            key,
            current: RwLock::new(current),
        }
    }

    /// login
    ///
    /// Replaces whatever session exists (never merges) with a new one derived from
    /// `email` and `role`, and persists it.
    pub fn login(&self, email: &str, role: Role) -> Result<Session, AppError> {
        let session = Session::new(email, role);
        let serialized = serde_json::to_string(&session).map_err(AppError::SessionEncoding)?;

        let mut current = self.write_lock();
        let previous = current.replace(session.clone());
        if let Err(e) = self.slot.write(&self.key, &serialized) {
            *current = previous;
            return Err(e.into());
        }

        tracing::info!(session_id = %session.id, role = %session.role, "session started");
        Ok(session)
    }

    /// logout
    ///
    /// Clears the session from memory and the slot. Calling it while signed out is a no-op.
    pub fn logout(&self) -> Result<(), AppError> {
        let mut current = self.write_lock();
        let previous = current.take();
        if let Err(e) = self.slot.remove(&self.key) {
            *current = previous;
            return Err(e.into());
        }

        if let Some(session) = previous {
            tracing::info!(session_id = %session.id, "session ended");
        }
        Ok(())
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn restore(slot: &dyn DurableSlot, key: &str) -> Result<Option<Session>, AppError> {
    let Some(raw) = slot.read(key)? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<SessionStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemorySlot;

    fn store_with(slot: Arc<MemorySlot>) -> SessionStore {
        SessionStore::initialize(slot, DEFAULT_SESSION_KEY)
    }

    #[test]
    fn display_name_capitalizes_local_part() {
        assert_eq!(display_name("nurse@x.com"), "Nurse");
        assert_eq!(display_name("dr.rao@hospital.in"), "Dr.rao");
        assert_eq!(display_name("Already@x.com"), "Already");
        assert_eq!(display_name("noatsign"), "Noatsign");
        assert_eq!(display_name("élodie@x.fr"), "Élodie");
        assert_eq!(display_name("@x.com"), "");
    }

    #[test]
    fn login_sets_defaults_and_persists() {
        let slot = Arc::new(MemorySlot::new());
        let store = store_with(slot.clone());

        let session = store.login("nurse@x.com", Role::Donor).unwrap();

        assert_eq!(session.name, "Nurse");
        assert_eq!(session.email, "nurse@x.com");
        assert_eq!(session.role, Role::Donor);
        assert_eq!(session.location, "Tirupati");
        assert_eq!(session.blood_group, Some(BloodGroup::OPositive));
        assert_eq!(store.current(), Some(session.clone()));

        let raw = slot.read(DEFAULT_SESSION_KEY).unwrap().unwrap();
        let persisted: Session = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, session);
    }

    #[test]
    fn login_replaces_previous_session() {
        let slot = Arc::new(MemorySlot::new());
        let store = store_with(slot.clone());

        let first = store.login("a@x.com", Role::Admin).unwrap();
        let second = store.login("b@x.com", Role::Seeker).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.current(), Some(second.clone()));
        let raw = slot.read(DEFAULT_SESSION_KEY).unwrap().unwrap();
        assert!(raw.contains("\"seeker\""));
        assert!(!raw.contains("a@x.com"));
    }

    #[test]
    fn logout_clears_memory_and_slot_and_is_idempotent() {
        let slot = Arc::new(MemorySlot::new());
        let store = store_with(slot.clone());
        store.login("nurse@x.com", Role::Donor).unwrap();

        store.logout().unwrap();
        assert_eq!(store.current(), None);
        assert!(!slot.contains(DEFAULT_SESSION_KEY));

        store.logout().unwrap();
        assert_eq!(store.current(), None);
        assert!(!slot.contains(DEFAULT_SESSION_KEY));
    }

    #[test]
    fn initialize_restores_persisted_session() {
        let slot = Arc::new(MemorySlot::new());
        let original = store_with(slot.clone())
            .login("keeper@bank.org", Role::BloodBank)
            .unwrap();

        let restarted = store_with(slot);
        assert_eq!(restarted.current(), Some(original));
    }

    #[test]
    fn initialize_accepts_records_written_by_the_web_client() {
        let raw = r#"{"id":"k3j4h5g6f","name":"Demo","email":"demo@rapidblood.com","role":"bloodBank","location":"Guntur"}"#;
        let slot = Arc::new(MemorySlot::with_entry(DEFAULT_SESSION_KEY, raw));

        let store = store_with(slot);
        let session = store.current().unwrap();
        assert_eq!(session.id, "k3j4h5g6f");
        assert_eq!(session.role, Role::BloodBank);
        assert_eq!(session.blood_group, None);
    }

    #[test]
    fn initialize_with_empty_slot_is_signed_out() {
        let store = store_with(Arc::new(MemorySlot::new()));
        assert_eq!(store.current(), None);
    }

    #[test]
    fn initialize_discards_malformed_record() {
        let slot = Arc::new(MemorySlot::with_entry(DEFAULT_SESSION_KEY, "{not json"));
        let store = store_with(slot.clone());

        assert_eq!(store.current(), None);
        assert!(!slot.contains(DEFAULT_SESSION_KEY));
    }

    #[test]
    fn initialize_discards_unknown_role() {
        let raw = r#"{"id":"1","name":"X","email":"x@y","role":"superuser","location":"Guntur"}"#;
        let slot = Arc::new(MemorySlot::with_entry(DEFAULT_SESSION_KEY, raw));
        assert_eq!(store_with(slot).current(), None);
    }

    #[test]
    fn failed_persist_rolls_back_login() {
        let store = SessionStore::initialize(Arc::new(MemorySlot::new_failing()), DEFAULT_SESSION_KEY);

        let result = store.login("nurse@x.com", Role::Donor);
        assert!(matches!(result, Err(AppError::Slot(_))));
        assert!(!result.unwrap_err().to_string().contains("malformed"));
        assert_eq!(store.current(), None);
    }

    #[test]
    fn failed_persist_rolls_back_logout() {
        let healthy = Arc::new(MemorySlot::new());
        let session = store_with(healthy.clone())
            .login("keeper@bank.org", Role::BloodBank)
            .unwrap();
        let raw = healthy.read(DEFAULT_SESSION_KEY).unwrap().unwrap();

        let slot = Arc::new(MemorySlot::with_entry(DEFAULT_SESSION_KEY, &raw).failing());
        let store = store_with(slot.clone());
        assert_eq!(store.current(), Some(session.clone()));

        let result = store.logout();
        assert!(matches!(result, Err(AppError::Slot(_))));
        assert_eq!(store.current(), Some(session));
        assert!(slot.contains(DEFAULT_SESSION_KEY));
    }
}
