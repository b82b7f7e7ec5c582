use anyhow::Context;
use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Url};
use std::{fmt::Debug, time::Duration};
use tracing::{debug, info, instrument};

use crate::{
    Config,
    error::FetchError,
    model::{ErrorBody, WeatherResponse},
};

/// Characters `encodeURIComponent` leaves alone, besides alphanumerics.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Source of weather data for one city.
#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> Result<WeatherResponse, FetchError>;
}

/// Backend reached over HTTP at `GET {base_url}/weather?city=...`.
///
/// The client keeps cookies, so a session obtained with [`HttpBackend::login`]
/// is sent with every later request.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    /// Backend at `base_url` with the transport's default limits.
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Backend described by the loaded configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for `city`, encoded like `encodeURIComponent`.
    pub fn weather_url(&self, city: &str) -> String {
        format!(
            "{}/weather?city={}",
            self.base_url.trim_end_matches('/'),
            utf8_percent_encode(city, COMPONENT)
        )
    }

    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url.trim_end_matches('/'))
    }

    /// Post the login form and keep the session cookie it hands out.
    ///
    /// A successful login redirects away from the form; landing back on the
    /// login page means the credentials were refused.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), FetchError> {
        let res = self
            .http
            .post(self.login_url())
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: None,
            });
        }
        if is_login_page(res.url()) {
            return Err(FetchError::LoginRejected);
        }

        info!("Logged in to weather backend");
        Ok(())
    }
}

#[async_trait]
impl WeatherBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn fetch(&self, city: &str) -> Result<WeatherResponse, FetchError> {
        let url = self.weather_url(city);
        debug!(url = %url, "Requesting weather");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if is_login_page(res.url()) {
            debug!(landed = %res.url(), "Weather request redirected to login");
            return Err(FetchError::LoginRequired);
        }

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "Weather backend rejected request");
            // A body that isn't JSON just means there is no message to show.
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

fn is_login_page(url: &Url) -> bool {
    url.path().trim_end_matches('/').ends_with("/login")
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
