use rapidblood::{
    models::Role,
    session::{DEFAULT_SESSION_KEY, SessionStore},
    slot::{DurableSlot, FileSlot, SlotState},
};
use std::{fs, path::PathBuf, sync::Arc};
use uuid::Uuid;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("rapidblood-slot-{}", Uuid::new_v4()))
}

#[test]
fn test_file_slot_round_trip_and_remove() {
    let dir = scratch_dir();
    let slot = FileSlot::new(&dir);

    assert_eq!(slot.read(DEFAULT_SESSION_KEY).unwrap(), None);

    slot.write(DEFAULT_SESSION_KEY, "{\"a\":1}").unwrap();
    assert_eq!(
        slot.read(DEFAULT_SESSION_KEY).unwrap().as_deref(),
        Some("{\"a\":1}")
    );
    assert!(dir.join("rb_user.json").exists());

    slot.remove(DEFAULT_SESSION_KEY).unwrap();
    assert_eq!(slot.read(DEFAULT_SESSION_KEY).unwrap(), None);
    // Removing again is fine.
    slot.remove(DEFAULT_SESSION_KEY).unwrap();

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_file_slot_keeps_traversal_keys_inside_dir() {
    let dir = scratch_dir();
    let slot = FileSlot::new(&dir);

    slot.write("../../escape", "x").unwrap();
    assert!(dir.join("escape.json").exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_session_survives_restart_on_disk() {
    let dir = scratch_dir();

    let first = SessionStore::initialize(
        Arc::new(FileSlot::new(&dir)) as SlotState,
        DEFAULT_SESSION_KEY,
    );
    let session = first.login("nurse@x.com", Role::Donor).unwrap();

    let raw = fs::read_to_string(dir.join("rb_user.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["role"], "donor");
    assert_eq!(stored["bloodGroup"], "O+");
    assert_eq!(stored["name"], "Nurse");

    let second = SessionStore::initialize(
        Arc::new(FileSlot::new(&dir)) as SlotState,
        DEFAULT_SESSION_KEY,
    );
    assert_eq!(second.current(), Some(session));

    second.logout().unwrap();
    assert!(!dir.join("rb_user.json").exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_malformed_file_is_treated_as_absent() {
    let dir = scratch_dir();
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("rb_user.json"), "{\"id\": 5").unwrap();

    let store = SessionStore::initialize(
        Arc::new(FileSlot::new(&dir)) as SlotState,
        DEFAULT_SESSION_KEY,
    );
    assert_eq!(store.current(), None);
    assert!(!dir.join("rb_user.json").exists());

    fs::remove_dir_all(&dir).ok();
}
