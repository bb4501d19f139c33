//! Outbound HTTP adapter.
//!
//! [`ApiClient`] resolves paths against the configured API root, attaches
//! the persisted bearer token to every request, and turns non-2xx
//! responses into [`ApiError::Api`]. Nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use quill_core::payload::FormPayload;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of a create/update request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Plain JSON object.
    Json(serde_json::Value),
    /// `multipart/form-data`, used whenever files are attached.
    Multipart(FormPayload),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| {
                ApiError::Core(quill_core::error::CoreError::Internal(format!(
                    "Failed to encode request body: {e}"
                )))
            })
    }

    fn kind(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "json",
            RequestBody::Multipart(_) => "multipart",
        }
    }

    fn apply(self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(match self {
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(payload) => builder.multipart(multipart_form(payload)?),
        })
    }
}

/// Convert a [`FormPayload`] into a reqwest multipart form.
pub fn multipart_form(payload: FormPayload) -> Result<Form, ApiError> {
    let (fields, files) = payload.into_parts();
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for file in files {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        form = form.part(file.field.form_name(), part);
    }
    Ok(form)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client bound to one API root and one session store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.api_base_url.clone(),
            session,
        })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        http: reqwest::Client,
        config: &ClientConfig,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            http,
            base_url: config.api_base_url.clone(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Absolute URL for a path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut builder = self.request(Method::GET, path)?;
        if !query.is_empty() {
            builder = builder.query(query);
        }
        Self::parse_response(builder.send().await?).await
    }

    /// `POST path` with a JSON or multipart body.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        self.send_body(Method::POST, path, body).await
    }

    /// `PATCH path` (partial update) with a JSON or multipart body.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        self.send_body(Method::PATCH, path, body).await
    }

    /// `DELETE path`. Any non-2xx status is a failure; the body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        Self::check_status(response).await
    }

    async fn send_body<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        tracing::debug!(%method, path, body = body.kind(), "Sending request body");
        let builder = body.apply(self.request(method, path)?)?;
        Self::parse_response(builder.send().await?).await
    }

    // ---- private helpers ----

    /// Start a request and attach the bearer token, if logged in.
    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "API request");
        let mut builder = self.http.request(method, url);
        if let Some(session) = self.session.load()? {
            builder = builder.bearer_auth(session.token);
        }
        Ok(builder)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Api`] containing
    /// the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "API request failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
