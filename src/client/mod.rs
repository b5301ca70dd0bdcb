//! FXCM REST client.
//!
//! [`FxcmClient`] holds the token, base URLs and the HTTP connection pool.
//! Calls are authenticated with the id of a live [`Session`]:
//! - [`trading`] - instruments, offers and subscription updates
//! - [`candles`] - historical candles

mod candles;
mod trading;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use crate::config::{Environment, FxcmConfig};
use crate::error::ServerError;
use crate::models::ResponseStatus;
use crate::tls::build_tls_config;
use crate::websocket::{DEFAULT_CONNECT_TIMEOUT, Session, open_session};
use crate::{FxcmError, Result};

/// Async client for the FXCM REST API.
pub struct FxcmClient {
    http: reqwest::Client,
    rest_url: Url,
    stream_url: Url,
    token: Zeroizing<String>,
    tls_config: Arc<rustls::ClientConfig>,
    connect_timeout: Duration,
}

impl fmt::Debug for FxcmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FxcmClient")
            .field("rest_url", &self.rest_url.as_str())
            .field("stream_url", &self.stream_url.as_str())
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl FxcmClient {
    /// Creates a client for one of the two FXCM environments.
    ///
    /// # Errors
    ///
    /// Returns a [`FxcmError`] if the TLS or HTTP client cannot be built.
    pub fn new(environment: Environment, token: impl Into<String>) -> Result<Self> {
        let tls_config = build_tls_config(None)?;
        Self::with_base_url(environment.base_url(), token, tls_config)
    }

    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`FxcmError`] if the CA bundle, base URL, or HTTP client
    /// is invalid.
    pub fn from_config(config: &FxcmConfig) -> Result<Self> {
        let tls_config = build_tls_config(config.ca_bundle.as_deref())?;
        Self::with_base_url(config.base_url(), config.token.clone(), tls_config)
    }

    /// Creates a client whose REST API and socket endpoint share one host.
    ///
    /// # Errors
    ///
    /// Returns a [`FxcmError`] if `base_url` is invalid or the HTTP client
    /// cannot be built.
    pub fn with_base_url(
        base_url: &str,
        token: impl Into<String>,
        tls_config: rustls::ClientConfig,
    ) -> Result<Self> {
        Self::with_urls(base_url, base_url, token, tls_config)
    }

    /// Creates a client with separate REST and socket hosts.
    ///
    /// # Errors
    ///
    /// Returns a [`FxcmError`] if either URL is invalid or the HTTP client
    /// cannot be built.
    pub fn with_urls(
        rest_url: &str,
        stream_url: &str,
        token: impl Into<String>,
        tls_config: rustls::ClientConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .use_preconfigured_tls(tls_config.clone())
            .build()
            .map_err(|e| FxcmError::Tls(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            rest_url: parse_base(rest_url)?,
            stream_url: parse_base(stream_url)?,
            token: Zeroizing::new(token.into()),
            tls_config: Arc::new(tls_config),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Sets how long [`connect`](Self::connect) waits for the server to
    /// acknowledge the session. Defaults to 20 seconds.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Base URL every REST path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.rest_url
    }

    /// Opens the Socket.IO session that authenticates subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`FxcmError::Connection`] if the handshake fails or times
    /// out.
    pub async fn connect(&self) -> Result<Session> {
        open_session(
            &self.stream_url,
            &self.token,
            self.tls_config.clone(),
            self.connect_timeout,
        )
        .await
    }

    /// Sends a GET request and decodes the envelope into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FxcmError::Server`] if the envelope reports failure, or a
    /// transport/decoding error.
    pub async fn get<T: DeserializeOwned>(&self, session: &Session, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, session, path)?;
        self.send_json(builder).await
    }

    /// Sends a GET request carrying a JSON body and decodes the envelope
    /// into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FxcmError::Server`] if the envelope reports failure, or a
    /// transport/decoding error.
    pub async fn get_with_body<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        session: &Session,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(Method::GET, session, path)?.json(body);
        self.send_json(builder).await
    }

    /// Sends a POST request with a JSON body and decodes the envelope into
    /// `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FxcmError::Server`] if the envelope reports failure, or a
    /// transport/decoding error.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        session: &Session,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(Method::POST, session, path)?.json(body);
        self.send_json(builder).await
    }

    /// Builds an authenticated request for `<base_url><path>`.
    fn request(&self, method: Method, session: &Session, path: &str) -> Result<RequestBuilder> {
        let url = self.rest_url.join(path)?;
        debug!(%method, path, session_id = session.id(), "Sending request");

        Ok(self
            .http
            .request(method, url)
            .bearer_auth(bearer_credential(session.id(), &self.token)))
    }

    /// Performs the call and unwraps the response envelope.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let value: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(FxcmError::UnexpectedStatus {
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let envelope: ResponseStatus = value
            .get("response")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| {
                FxcmError::MalformedMessage("response envelope is missing".to_string())
            })?;

        if !envelope.executed {
            let payload = envelope.error.unwrap_or(serde_json::Value::Null);
            debug!(%status, error = %payload, "Request was not executed");
            return Err(FxcmError::Server(ServerError::new(payload)));
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// The bearer credential: session id and token concatenated without a
/// separator.
fn bearer_credential(session_id: &str, token: &str) -> String {
    format!("{session_id}{token}")
}

/// Parses a base URL, ensuring relative paths resolve beneath it.
fn parse_base(url: &str) -> Result<Url> {
    if url.ends_with('/') {
        Ok(Url::parse(url)?)
    } else {
        Ok(Url::parse(&format!("{url}/"))?)
    }
}
