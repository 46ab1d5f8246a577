// Unity-DP HTTP client
//
// Wraps `reqwest::Client` with the card's endpoint layout, HTTP Basic
// auth on every call, and the session-actor token lifecycle: acquired
// on first use, proactively refreshed before each data call, injected
// into every query/body, and rotated from every 200 response body.
// Point read/write and the high-level commands are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::sync::RwLock;

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::points;
use crate::process;
use crate::subsystem::{Reading, Subsystem};
use crate::transport::TransportConfig;
use crate::wire::{self, SESSION_KEY};

pub(crate) const LOGIN_PATH: &str = "/protected/session/unityLogin.htm";
pub(crate) const SESSION_INFO_PATH: &str = "/protected/session/getSessionInfo.htm";
pub(crate) const HTTP_GET_PATH: &str = "/httpGetSet/httpGet.htm";
pub(crate) const HTTP_SET_PATH: &str = "/protected/httpSet.htm";

/// Device index of the card itself, used on the session endpoints.
pub const SESSION_DEV_ID: u32 = 4;

/// Default device index for point reads and writes.
pub const DATA_DEV_ID: u32 = 0;

/// Client for a Unity-DP UPS web card.
///
/// Holds the host, Basic-auth credentials, and the mutable session
/// token. All data access goes through the subsystem facades returned
/// by [`system`](Self::system) and friends, or the high-level command
/// methods. One client maps to one card; independent clients share
/// nothing.
pub struct UnityClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
    session_dev_id: u32,
    /// Session-actor token. `None` until the first successful login;
    /// rotated whenever a response body carries a fresh `sessACT`.
    token: RwLock<Option<String>>,
}

impl UnityClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the card root, e.g. `https://192.168.1.100`.
    /// No network traffic happens here; the session is established on
    /// the first call (or an explicit [`login`](Self::login)).
    pub fn new(
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username: username.into(),
            password,
            session_dev_id: SESSION_DEV_ID,
            token: RwLock::new(None),
        }
    }

    /// The card base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Device index used on the session endpoints.
    pub fn session_dev_id(&self) -> u32 {
        self.session_dev_id
    }

    /// Whether a session token is currently held.
    pub fn has_session(&self) -> bool {
        self.token().is_some()
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    // ── Session token management ─────────────────────────────────────

    pub(crate) fn token(&self) -> Option<String> {
        self.token.read().expect("session lock poisoned").clone()
    }

    pub(crate) fn set_token(&self, token: String) {
        debug!("storing session token");
        *self.token.write().expect("session lock poisoned") = Some(token);
    }

    pub(crate) fn clear_token(&self) {
        *self.token.write().expect("session lock poisoned") = None;
    }

    /// Update the stored token if the body carries a rotated value.
    pub(crate) fn rotate_token_from(&self, body: &str) {
        if let Some(token) = wire::session_token(body) {
            trace!("session token rotated");
            *self.token.write().expect("session lock poisoned") = Some(token.to_owned());
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request core ─────────────────────────────────────────────────

    /// Authenticated GET with session handling.
    ///
    /// Logs in first if no token is held, runs the best-effort session
    /// refresh, injects `sessACT` into the query, and rotates the token
    /// from the response body.
    pub(crate) async fn request_get(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<String, Error> {
        self.ensure_session().await?;
        self.refresh_session().await;

        let mut query = params.to_vec();
        if let Some(token) = self.token() {
            query.push((SESSION_KEY.to_owned(), token));
        }

        let url = self.endpoint(path)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .query(&query)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.read_body(resp).await
    }

    /// Authenticated POST with session handling; the body is sent
    /// form-urlencoded with `sessACT` appended.
    pub(crate) async fn request_post(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<String, Error> {
        self.ensure_session().await?;
        self.refresh_session().await;

        let mut body = form.to_vec();
        if let Some(token) = self.token() {
            body.push((SESSION_KEY.to_owned(), token));
        }

        let url = self.endpoint(path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .form(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.read_body(resp).await
    }

    async fn ensure_session(&self) -> Result<(), Error> {
        if self.token().is_none() {
            self.login().await?;
        }
        Ok(())
    }

    /// Check the status, rotate the token, and hand back the body.
    ///
    /// A 401/403 drops the stored token so the next call re-logins.
    async fn read_body(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            self.clear_token();
            return Err(Error::Authentication {
                message: format!("session rejected (HTTP {status})"),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // char-wise so a multibyte body can't split mid-character
            let preview: String = body.chars().take(200).collect();
            return Err(Error::Protocol {
                message: format!("HTTP {status}: {preview}"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        self.rotate_token_from(&body);
        Ok(body)
    }

    // ── Subsystem facades ────────────────────────────────────────────

    /// System subsystem: identity, counters, site settings.
    pub fn system(&self) -> Subsystem<'_> {
        Subsystem::new(self, points::SYSTEM, process::table_for("system"), DATA_DEV_ID)
    }

    /// Battery subsystem: charge, runtime, charger state.
    pub fn battery(&self) -> Subsystem<'_> {
        Subsystem::new(self, points::BATTERY, process::table_for("battery"), DATA_DEV_ID)
    }

    /// Input subsystem: mains voltage, current, frequency.
    pub fn input(&self) -> Subsystem<'_> {
        Subsystem::new(self, points::INPUT, process::table_for("input"), DATA_DEV_ID)
    }

    /// Output subsystem: load, watts, VA, derived power factor.
    pub fn output(&self) -> Subsystem<'_> {
        Subsystem::new(self, points::OUTPUT, process::table_for("output"), DATA_DEV_ID)
    }

    /// Bypass subsystem (flat, no categories).
    pub fn bypass(&self) -> Subsystem<'_> {
        Subsystem::new(self, points::BYPASS, process::table_for("bypass"), DATA_DEV_ID)
    }

    /// Full nested status for every subsystem, for presentation layers.
    ///
    /// Walks the registry's subsystem list so the output keys and order
    /// always match what the registry declares.
    pub async fn get_all_status(&self) -> Result<IndexMap<String, Reading>, Error> {
        let mut all = IndexMap::new();
        for (name, group) in points::SUBSYSTEMS {
            let subsystem = Subsystem::new(self, group, process::table_for(name), DATA_DEV_ID);
            all.insert((*name).to_owned(), Reading::Group(subsystem.get_all().await?));
        }
        Ok(all)
    }
}
