//! Secure token storage via the system keychain.
//!
//! At startup, [`populate_env_from_keychain`] copies a stored API token into
//! `FXCM_TOKEN` so the existing config flow picks it up transparently.

use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Keychain service name used for the stored token.
const SERVICE: &str = "fxcm-api";

/// Keychain entry holding the FXCM API token.
const TOKEN_ENTRY: &str = "fxcm_token";

/// Environment variable the token is exported to.
pub const TOKEN_ENV_VAR: &str = "FXCM_TOKEN";

/// Loads the token from the keychain, returning `None` if not set.
pub fn load_token() -> Option<Zeroizing<String>> {
    let entry = keyring::Entry::new(SERVICE, TOKEN_ENTRY).ok()?;
    match entry.get_password() {
        Ok(password) => Some(Zeroizing::new(password)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(entry = TOKEN_ENTRY, error = %e, "failed to read keychain entry");
            None
        }
    }
}

/// Saves the token to the keychain, trimming surrounding whitespace.
///
/// # Errors
///
/// Returns [`crate::FxcmError::Config`] if the token is blank or the
/// keychain rejects it.
pub fn save_token(value: &str) -> crate::Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::FxcmError::Config("token is empty".into()));
    }

    let entry = keyring::Entry::new(SERVICE, TOKEN_ENTRY)
        .map_err(|e| crate::FxcmError::Config(format!("keyring entry error: {e}")))?;
    entry
        .set_password(value)
        .map_err(|e| crate::FxcmError::Config(format!("failed to save to keychain: {e}")))
}

/// Sets `FXCM_TOKEN` from the keychain if it is not already set.
///
/// Call this at startup before [`crate::config::fetch_config`].
pub fn populate_env_from_keychain() {
    if std::env::var(TOKEN_ENV_VAR).is_ok() {
        return;
    }

    if let Some(token) = load_token() {
        debug!(var = TOKEN_ENV_VAR, "loaded token from keychain");
        // SAFETY: single-threaded at this point (before any tasks are spawned)
        unsafe {
            std::env::set_var(TOKEN_ENV_VAR, token.as_str());
        }
    }
}
