// Session authentication
//
// The card has no cookie or bearer scheme: every call carries HTTP
// Basic credentials, and session continuity rides on the `sessACT`
// token parsed out of semicolon-delimited response bodies. Login
// acquires the token; the session-info endpoint keeps it fresh.

use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::debug;

use crate::client::{LOGIN_PATH, SESSION_INFO_PATH, UnityClient};
use crate::error::Error;
use crate::wire;

/// The refresh call is advisory; keep it on a short leash.
const REFRESH_TIMEOUT: Duration = Duration::from_secs(5);

impl UnityClient {
    /// Authenticate with the card and store the session token.
    ///
    /// `GET /protected/session/unityLogin.htm?devId={session_dev_id}`
    /// with HTTP Basic auth; the body is parsed for `sessACT=`. On any
    /// failure (non-200, tokenless body, transport) the stored token
    /// stays unset, so the next data call attempts login again.
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.endpoint(LOGIN_PATH)?;
        debug!("logging in at {url}");

        let resp = self
            .http()
            .get(url)
            .basic_auth(self.username(), Some(self.password().expose_secret()))
            .query(&[("devId", self.session_dev_id().to_string())])
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        match wire::session_token(&body) {
            Some(token) => {
                self.set_token(token.to_owned());
                debug!("login successful");
                Ok(())
            }
            None => Err(Error::Authentication {
                message: "login response carried no session token".into(),
            }),
        }
    }

    /// Best-effort proactive token refresh before a data call.
    ///
    /// `GET /protected/session/getSessionInfo.htm` with `devId`,
    /// `sessACT`, `action=0`. Failures here are swallowed: a stale
    /// token still gets one shot at the real request, and an expired
    /// session surfaces there as an auth error.
    pub(crate) async fn refresh_session(&self) {
        let Some(token) = self.token() else { return };
        let Ok(url) = self.endpoint(SESSION_INFO_PATH) else {
            return;
        };

        let result = self
            .http()
            .get(url)
            .basic_auth(self.username(), Some(self.password().expose_secret()))
            .query(&[
                ("devId", self.session_dev_id().to_string()),
                ("sessACT", token),
                ("action", "0".to_owned()),
            ])
            .timeout(REFRESH_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                if let Ok(body) = resp.text().await {
                    self.rotate_token_from(&body);
                }
            }
            Ok(resp) => debug!("session refresh returned HTTP {}", resp.status()),
            Err(e) => debug!("session refresh failed: {e}"),
        }
    }
}
