//! TLS configuration shared by the REST client and the WebSocket connector.
//!
//! Builds a [`rustls::ClientConfig`] that trusts the Mozilla root set from
//! `webpki-roots`, optionally extended with CA certificates read from a
//! PEM bundle (for corporate proxies or local test hosts).

use std::path::Path;
use std::sync::Arc;

use rustls::ClientConfig;
use tracing::debug;

use crate::{FxcmError, Result};

/// Builds a [`ClientConfig`] rooted at the webpki roots plus every
/// certificate found in `extra_ca`, if given.
///
/// # Errors
///
/// Returns [`FxcmError::Tls`] if the bundle cannot be read, contains no
/// certificates, or the protocol versions cannot be configured.
pub fn build_tls_config(extra_ca: Option<&Path>) -> Result<ClientConfig> {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    if let Some(path) = extra_ca {
        let pem = std::fs::read(path)
            .map_err(|e| FxcmError::Tls(format!("failed to read {}: {e}", path.display())))?;

        let certs: Vec<_> = rustls_pemfile::certs(&mut pem.as_slice())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| FxcmError::Tls(format!("failed to parse CA PEM: {e}")))?;

        if certs.is_empty() {
            return Err(FxcmError::Tls(format!(
                "no certificates found in {}",
                path.display()
            )));
        }

        let (added, ignored) = root_store.add_parsable_certificates(certs);
        debug!(added, ignored, bundle = %path.display(), "loaded extra CA certificates");
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| FxcmError::Tls(format!("unsupported protocol versions: {e}")))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(config)
}
