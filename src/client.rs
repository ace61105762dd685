use std::time::Duration;

use bytes::Bytes;
use reqwest::{multipart::Form, Method};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, Error, Result};
use crate::session::Session;

/// Request payload.
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

/// Authenticated client for the storage backend.
///
/// Every call carries the token of the session the client was built with.
/// Calls fire even without a token, rejecting them is up to the backend.
/// Nothing is retried.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl Client {
    pub fn new(config: &Config, session: Session) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("base url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base url '{}' cannot be a base",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("filedash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Url of the endpoint made of the given path segments. Segments are
    /// percent encoded, so ids can be passed as is.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config("base url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Sends a request and decodes the json body into `T`. A body that
    /// does not decode is a [`Error::MalformedResponse`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Body,
    ) -> Result<T> {
        let bytes = self.send(method, segments, query, body).await?;
        decode(&bytes)
    }

    /// Sends a request whose answer is only an acknowledgement. The body
    /// is ignored, empty or not.
    pub async fn execute(&self, method: Method, segments: &[&str], body: Body) -> Result<()> {
        self.send(method, segments, &[], body).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Body,
    ) -> Result<Bytes> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);

        let mut builder = self.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|err| {
            warn!("{} {} failed: {}", method, url, err);
            ApiError::from(err)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        if !status.is_success() {
            let err = ApiError::from_body(status, &String::from_utf8_lossy(&bytes));
            warn!("{} {} returned error: {}", method, url, err);
            return Err(err.into());
        }

        Ok(bytes)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::MalformedResponse(e.to_string()))
}
