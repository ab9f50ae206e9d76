// One-shot HTTP client for the streammux API.
//
// Wraps `reqwest::Client` with the server's endpoint layout and a hard
// fail-safe timeout. Nothing here retries: a request either completes
// within the window or the caller gets an explicit error.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::types::{ApiMessage, CtrlCommand, StatusReport, VersionInfo};

/// Fail-safe window for every one-shot request and the `/ws` handshake.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(2500);

/// Resolve the version and WebSocket endpoints relative to a server base URL.
///
/// The WebSocket scheme mirrors the page scheme: `http` → `ws`, `https` → `wss`.
pub fn endpoints(base: &Url) -> Result<(Url, Url), Error> {
    let version = base.join("/version")?;
    let mut ws = base.join("/ws")?;
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    // Switching between special schemes is always accepted by `url`.
    let _ = ws.set_scheme(scheme);
    Ok((version, ws))
}

/// HTTP client for `GET /version`, `GET /status` and `POST /ctrl`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client with the default fail-safe timeout.
    pub fn new(base_url: Url) -> Result<Self, Error> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Build a client with a custom timeout.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("smux/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// Use a pre-built `reqwest::Client` (tests, shared pools).
    pub fn from_reqwest(base_url: Url, http: reqwest::Client, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the version banner payload.
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        self.get("/version").await
    }

    /// Fetch the most recent full status snapshot.
    pub async fn status(&self) -> Result<StatusReport, Error> {
        match self.get::<ApiMessage>("/status").await? {
            ApiMessage::Status(report) => Ok(report),
            other => Err(Error::Deserialization {
                message: format!("expected status message, got {other:?}"),
                body: String::new(),
            }),
        }
    }

    /// Send a control command and return the server's confirmation,
    /// which carries the resulting enablement of both endpoints.
    pub async fn ctrl(&self, cmd: &CtrlCommand) -> Result<CtrlCommand, Error> {
        let reply: ApiMessage = self.post("/ctrl", cmd).await?;
        match reply {
            ApiMessage::Ctrl { data } => Ok(data),
            other => Err(Error::Deserialization {
                message: format!("expected ctrl confirmation, got {other:?}"),
                body: String::new(),
            }),
        }
    }

    // ── Transport helpers ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!(%url, "GET");
        let fut = self.http.get(url).send();
        let resp = self.within_timeout(fut).await?;
        self.parse(path, resp).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!(%url, "POST");
        let fut = self.http.post(url).json(body).send();
        let resp = self.within_timeout(fut).await?;
        self.parse(path, resp).await
    }

    async fn within_timeout<F>(&self, fut: F) -> Result<reqwest::Response, Error>
    where
        F: Future<Output = reqwest::Result<reqwest::Response>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(resp)) => Ok(resp),
            Ok(Err(e)) if e.is_timeout() => Err(self.timeout_error()),
            Ok(Err(e)) => Err(Error::Transport(e)),
            Err(_) => Err(self.timeout_error()),
        }
    }

    async fn parse<T: DeserializeOwned>(
        &self,
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST && path == "/ctrl" {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Rejected(body));
        }
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                path: path.to_owned(),
            });
        }
        let body = resp.text().await?;
        trace!(path, len = body.len(), "response body");
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    fn timeout_error(&self) -> Error {
        Error::Timeout {
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_switch_scheme() {
        let base = Url::parse("http://10.0.0.5:8080/").unwrap();
        let (version, ws) = endpoints(&base).unwrap();
        assert_eq!(version.as_str(), "http://10.0.0.5:8080/version");
        assert_eq!(ws.as_str(), "ws://10.0.0.5:8080/ws");

        let base = Url::parse("https://mux.example.org/dashboard/").unwrap();
        let (version, ws) = endpoints(&base).unwrap();
        assert_eq!(version.as_str(), "https://mux.example.org/version");
        assert_eq!(ws.as_str(), "wss://mux.example.org/ws");
    }
}
