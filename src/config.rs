use std::env;
use std::path::PathBuf;

use crate::session::DEFAULT_SESSION_KEY;

/// AppConfig
///
/// Holds the service's configuration. Immutable once loaded and pulled into handlers
/// through the application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and how strict loading is.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Directory backing the durable session slot.
    pub slot_dir: PathBuf,
    // Key of the session entry inside the slot.
    pub session_key: String,
    // Fixed seed for the mock catalog; random when unset.
    pub catalog_seed: Option<u64>,
}

/// Env
///
/// Runtime context: pretty logs and lenient defaults locally, JSON logs and explicit
/// settings in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const LOCAL_SLOT_DIR: &str = ".rapidblood";

impl Default for AppConfig {
    /// Non-panicking configuration for test scaffolding; no environment access.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            slot_dir: env::temp_dir().join("rapidblood-test"),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            catalog_seed: Some(0),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `RAPIDBLOOD_SLOT_DIR` is missing, and whenever
    /// `RAPIDBLOOD_SEED` is set but not an unsigned integer. Failing at startup beats
    /// persisting sessions somewhere nobody chose.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let slot_dir = match env {
            Env::Production => env::var("RAPIDBLOOD_SLOT_DIR")
                .expect("FATAL: RAPIDBLOOD_SLOT_DIR must be set in production."),
            Env::Local => {
                env::var("RAPIDBLOOD_SLOT_DIR").unwrap_or_else(|_| LOCAL_SLOT_DIR.to_string())
            }
        };

        let catalog_seed = env::var("RAPIDBLOOD_SEED").ok().map(|raw| {
            raw.parse::<u64>()
                .expect("FATAL: RAPIDBLOOD_SEED must be an unsigned integer")
        });

        Self {
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            slot_dir: PathBuf::from(slot_dir),
            session_key: env::var("RAPIDBLOOD_SESSION_KEY")
                .unwrap_or_else(|_| DEFAULT_SESSION_KEY.to_string()),
            catalog_seed,
        }
    }
}
