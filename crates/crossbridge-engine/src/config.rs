//! Bridge config loader (strict parsing).

use std::fs;

use serde::Deserialize;

use crossbridge_core::error::{BridgeError, Result};

/// Ten minutes. Hardware wallets can take a long time to sign.
fn default_timeout_ms() -> u64 {
    600_000
}

fn default_send_as_string() -> bool {
    true
}

/// Per-instance bridge configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Pending-call expiry in milliseconds. 0 disables sweeping entirely.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Serialize envelopes to JSON text before handing them to the
    /// transport; false passes the structured envelope through for
    /// transports that can carry objects.
    #[serde(default = "default_send_as_string")]
    pub send_as_string: bool,

    /// Enable the debug trace cache and wire-level trace logging.
    #[serde(default)]
    pub trace: bool,

    /// This context's own origin, stamped into outbound envelopes.
    #[serde(default)]
    pub origin: Option<String>,

    /// The injected (client) side knows its own context and may receive
    /// messages without an origin.
    #[serde(default)]
    pub is_injected: bool,

    /// Host-UI side; enables the legacy broadcast filter for internal
    /// messages.
    #[serde(default)]
    pub is_ext_ui: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            send_as_string: default_send_as_string(),
            trace: false,
            origin: None,
            is_injected: false,
            is_ext_ui: false,
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.is_injected && self.is_ext_ui {
            return Err(BridgeError::Config(
                "is_injected and is_ext_ui are mutually exclusive roles".into(),
            ));
        }
        if let Some(origin) = &self.origin {
            if origin.is_empty() {
                return Err(BridgeError::Config(
                    "origin must not be empty when set".into(),
                ));
            }
        }
        Ok(())
    }
}

pub fn load_from_file(path: &str) -> Result<BridgeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| BridgeError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BridgeConfig> {
    let cfg: BridgeConfig =
        serde_yaml::from_str(s).map_err(|e| BridgeError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
