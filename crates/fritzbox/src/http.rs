//! HTTP implementation of [`RouterClient`].
//!
//! Logs in through `login_sid.lua`, reads the REST API under `/api/v0`
//! with an `AVM-SID` authorization header, and toggles parental-control
//! blocking through the `data.lua` form endpoint used by the web UI.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::client::RouterClient;
use crate::error::RouterError;
use crate::session::{self, SessionInfo};
use crate::types::{Dataset, Landevice, LandeviceResponse, MonitorConfig, SubsetData};

/// Default router address.
pub const DEFAULT_BASE_URL: &str = "http://192.168.2.1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LOGIN_PATH: &str = "/login_sid.lua?version=2";
const REST_PREFIX: &str = "/api/v0";
const DATA_PATH: &str = "/data.lua";

/// Connection settings for one router.
#[derive(Debug, Clone)]
pub struct FritzboxConfig {
    /// Base URL without trailing slash, e.g. `http://192.168.2.1`.
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl FritzboxConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct FritzboxClient {
    http: reqwest::Client,
    config: FritzboxConfig,
    /// Session id after a successful `connect()`.
    sid: RwLock<Option<String>>,
}

impl FritzboxClient {
    /// Build a client. Routers ship self-signed certificates, so
    /// certificate validation is disabled.
    pub fn new(mut config: FritzboxConfig) -> Result<Self, RouterError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            http,
            config,
            sid: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn current_sid(&self) -> Result<String, RouterError> {
        self.sid.read().await.clone().ok_or(RouterError::NotConnected)
    }

    /// `GET /api/v0/{path}` decoded as JSON.
    async fn rest_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RouterError> {
        let sid = self.current_sid().await?;

        let response = self
            .http
            .get(self.url(&format!("{REST_PREFIX}/{path}")))
            .header(AUTHORIZATION, format!("AVM-SID {sid}"))
            .send()
            .await?;

        let body = Self::ensure_success(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    // ---- private helpers ----

    /// Return the response unchanged on a 2xx status, or an
    /// [`RouterError::Api`] carrying status and body otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RouterError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RouterError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RouterClient for FritzboxClient {
    async fn connect(&self) -> Result<(), RouterError> {
        let login_url = self.url(LOGIN_PATH);

        let response = self.http.get(&login_url).send().await?;
        let info = SessionInfo::parse(&Self::ensure_success(response).await?.text().await?)?;
        if info.block_time > 0 {
            return Err(RouterError::LoginBlocked {
                seconds: info.block_time,
            });
        }

        let answer = session::solve_challenge(&info.challenge, &self.config.password)?;
        let response = self
            .http
            .post(&login_url)
            .form(&[
                ("username", self.config.username.as_str()),
                ("response", answer.as_str()),
            ])
            .send()
            .await?;
        let info = SessionInfo::parse(&Self::ensure_success(response).await?.text().await?)?;

        if !info.is_authenticated() {
            return Err(RouterError::LoginRejected {
                username: self.config.username.clone(),
            });
        }

        tracing::debug!(base_url = %self.config.base_url, "Router session established");
        *self.sid.write().await = Some(info.sid);
        Ok(())
    }

    async fn get_landevices(&self) -> Result<Vec<Landevice>, RouterError> {
        let resp: LandeviceResponse = self.rest_get("landevice").await?;
        Ok(resp.landevice)
    }

    async fn get_monitor_config(&self) -> Result<MonitorConfig, RouterError> {
        self.rest_get("monitor/configuration").await
    }

    async fn get_monitor_datasets(&self) -> Result<Vec<Dataset>, RouterError> {
        self.rest_get("monitor/datasets").await
    }

    async fn get_monitor_data(
        &self,
        dataset: &str,
        subset: &str,
    ) -> Result<Vec<SubsetData>, RouterError> {
        self.rest_get(&format!("monitor/{dataset}/{subset}")).await
    }

    async fn block_device(&self, identifier: &str, block: bool) -> Result<(), RouterError> {
        let sid = self.current_sid().await?;
        let blocked = block.to_string();

        let response = self
            .http
            .post(self.url(DATA_PATH))
            .form(&[
                ("xhr", "1"),
                ("sid", sid.as_str()),
                ("edit-profiles", ""),
                ("blocked", blocked.as_str()),
                ("toBeBlocked", identifier),
                ("lang", "en"),
                ("page", "kidLis"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(RouterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(identifier, block, "Router accepted block request");
        Ok(())
    }
}
