//! Remote query connector - stored queries over HTTP with a session cookie.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use ensure_core::{AuthRequirement, Connector, ConnectorError, Presence, ResourceDefinition};

use crate::catalog::QueryPayload;
use crate::config::SapSettings;
use crate::error::ConfigError;
use crate::flavor::NOT_FOUND_MARKER;
use crate::session::Session;

const NOT_LOGGED_IN: &str = "not logged in";

/// Connector for named server-side queries.
///
/// Without a session no request is sent: checks are `Unknown` and creates fail.
pub struct RemoteQueryConnector {
    client: Client,
    base: Url,
    settings: SapSettings,
    session: RwLock<Option<Session>>,
}

impl RemoteQueryConnector {
    pub fn new(settings: SapSettings) -> Result<Self, ConfigError> {
        let base = Url::parse(&settings.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: settings.base_url.clone(),
                reason: "not a base url".to_string(),
            });
        }
        if settings.insecure {
            warn!("TLS certificate verification disabled for the query service");
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(settings.insecure)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base,
            settings,
            session: RwLock::new(None),
        })
    }

    fn endpoint(&self, segments: &[String]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Cookie header of the current session, if logged in.
    async fn session_cookie(&self) -> Option<String> {
        self.session.read().await.as_ref().map(Session::cookie_header)
    }

    fn with_cookie(request: RequestBuilder, cookie: &str) -> RequestBuilder {
        request.header(COOKIE, cookie)
    }

    async fn login(&self) -> Result<Session, String> {
        let flavor = self.settings.flavor;
        let url = self.endpoint(&flavor.login_segments());
        let body = flavor.login_body(
            &self.settings.username,
            &self.settings.password,
            &self.settings.company_db,
        );

        let response = self
            .client
            .post(url)
            .timeout(self.settings.login_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("login returned {}", status));
        }
        let headers = response.headers().clone();
        let text = response.text().await.map_err(|e| e.to_string())?;
        Session::from_login(flavor.cookie_name(), &headers, &text)
            .ok_or_else(|| "login response carried no session token".to_string())
    }
}

#[async_trait]
impl Connector for RemoteQueryConnector {
    type Payload = QueryPayload;

    fn name(&self) -> &str {
        "remote-query"
    }

    fn auth_requirement(&self) -> AuthRequirement {
        AuthRequirement::Opportunistic
    }

    async fn authenticate(&self) -> bool {
        let missing = self.settings.missing();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Query service configuration incomplete, not logging in");
            return false;
        }

        match self.login().await {
            Ok(session) => {
                *self.session.write().await = Some(session);
                info!(server = %self.base, company = %self.settings.company_db, "Logged in to query service");
                true
            }
            Err(reason) => {
                warn!(server = %self.base, reason = %reason, "Query service login failed");
                false
            }
        }
    }

    async fn exists(&self, def: &ResourceDefinition<QueryPayload>) -> Presence {
        let Some(cookie) = self.session_cookie().await else {
            return Presence::Unknown(NOT_LOGGED_IN.to_string());
        };
        let url = self.endpoint(&self.settings.flavor.resource_segments(&def.id));
        let request = Self::with_cookie(self.client.get(url), &cookie);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(query = %def.id, error = %e, "Error checking query");
                return Presence::Unknown(e.to_string());
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            return Presence::Present;
        }
        if status == StatusCode::NOT_FOUND {
            return Presence::Absent;
        }
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() >= 400 && body.contains(NOT_FOUND_MARKER) {
            return Presence::Absent;
        }
        warn!(query = %def.id, status = %status, "Unexpected response checking query");
        Presence::Unknown(format!("unexpected status {}", status))
    }

    async fn create(&self, def: &ResourceDefinition<QueryPayload>) -> Result<(), ConnectorError> {
        let cookie = self
            .session_cookie()
            .await
            .ok_or_else(|| ConnectorError::Transport(NOT_LOGGED_IN.to_string()))?;
        let url = self.endpoint(&self.settings.flavor.collection_segments());
        let body = self.settings.flavor.create_body(def);
        let request = Self::with_cookie(self.client.post(url).json(&body), &cookie);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ConnectorError::Timeout(self.settings.request_timeout)
            } else {
                ConnectorError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        match status.as_u16() {
            200 | 201 | 204 => {
                info!(query = %def.id, name = %def.label, "Created stored query");
                Ok(())
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ConnectorError::Rejected(format!("{} - {}", status, text.trim())))
            }
        }
    }

    async fn close(&self) {
        let Some(cookie) = self.session_cookie().await else {
            return;
        };
        if let Some(segments) = self.settings.flavor.logout_segments() {
            let request = Self::with_cookie(self.client.post(self.endpoint(&segments)), &cookie);
            match request.send().await {
                Ok(r) => debug!(status = %r.status(), "Logged out of query service"),
                Err(e) => debug!(error = %e, "Logout failed"),
            }
        }
        self.session.write().await.take();
    }
}
