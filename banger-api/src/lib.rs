pub mod endpoints;
mod envelope;
mod error;
mod macros;
pub mod repositories;
mod request;

pub use crate::error::{ApiError, HttpError};
pub use crate::request::{EmptyResponse, Request as ApiRequest, RequestData};
use repositories::*;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://localhost:3001/api";
const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Cookie-carrying JSON client for the Banger backend.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    jar: Arc<Jar>,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_jar(base_url, Arc::new(Jar::default()))
    }

    pub fn with_jar(base_url: impl Into<String>, jar: Arc<Jar>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            jar,
        })
    }

    /// Same connection pool and cookies, different API host.
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            jar: self.jar.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cookies the backend has set for this origin, as a `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        let url = Url::parse(&self.base_url).ok()?;
        self.jar
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Seed the jar from a header previously returned by [`Client::cookie_header`].
    pub fn restore_cookies(&self, header: &str) {
        let Ok(url) = Url::parse(&self.base_url) else {
            tracing::warn!(base_url = %self.base_url, "Cannot restore cookies for invalid base URL");
            return;
        };
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &url);
        }
    }

    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }

    pub async fn send<R>(&self, request: R) -> Result<R::Response, ApiError>
    where
        R: ApiRequest,
    {
        let url = self.url_for(&request.endpoint());
        let mut builder = self.http.request(R::METHOD, &url);
        builder = match request.data() {
            RequestData::Empty => builder,
            RequestData::Query(query) => builder.query(query),
            RequestData::Json(body) => builder.json(body),
        };

        tracing::debug!(method = %R::METHOD, %url, "Sending request");
        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let text = response.text().await?;
        tracing::debug!(method = %R::METHOD, %url, %status, "Received response");

        let body = if is_json {
            // A malformed JSON body reads as an empty object, like an empty error payload
            Some(serde_json::from_str::<Value>(&text).unwrap_or_else(|_| Value::Object(Default::default())))
        } else {
            None
        };

        if !status.is_success() {
            return Err(HttpError::from_body(status, body.as_ref()).into());
        }

        let payload = envelope::unwrap(body.unwrap_or(Value::Null));
        serde_json::from_value(payload).map_err(ApiError::Decode)
    }
}

pub struct Request;

impl Request {
    pub fn auth() -> AuthRepository {
        AuthRepository::new()
    }

    pub fn integrations() -> IntegrationRepository {
        IntegrationRepository::new()
    }

    pub fn spotify() -> SpotifyRepository {
        SpotifyRepository::new()
    }

    pub fn posts() -> PostRepository {
        PostRepository::new()
    }

    pub fn users() -> UserRepository {
        UserRepository::new()
    }
}
