use rapidblood::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic};

const VARS: [&str; 5] = [
    "APP_ENV",
    "BIND_ADDR",
    "RAPIDBLOOD_SLOT_DIR",
    "RAPIDBLOOD_SESSION_KEY",
    "RAPIDBLOOD_SEED",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with a clean slate for the config variables and restores them afterwards,
/// re-raising any panic.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original) in originals {
        unsafe {
            match original {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

#[test]
#[serial]
fn test_local_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.slot_dir, std::path::PathBuf::from(".rapidblood"));
    assert_eq!(config.session_key, "rb_user");
    assert_eq!(config.catalog_seed, None);
}

#[test]
#[serial]
fn test_overrides_are_read() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
            env::set_var("RAPIDBLOOD_SLOT_DIR", "/var/lib/rapidblood");
            env::set_var("RAPIDBLOOD_SESSION_KEY", "rb_user_v2");
            env::set_var("RAPIDBLOOD_SEED", "42");
        }
        AppConfig::load()
    });

    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(
        config.slot_dir,
        std::path::PathBuf::from("/var/lib/rapidblood")
    );
    assert_eq!(config.session_key, "rb_user_v2");
    assert_eq!(config.catalog_seed, Some(42));
}

#[test]
#[serial]
fn test_production_requires_slot_dir() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without RAPIDBLOOD_SLOT_DIR"
    );
}

#[test]
#[serial]
fn test_bad_seed_fails_fast() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("RAPIDBLOOD_SEED", "not-a-number");
            }
            AppConfig::load()
        })
    });

    assert!(result.is_err());
}
