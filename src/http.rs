//! HTTP Client Wrapper
//!
//! reqwest client with two interceptors:
//! - **Request**: attaches the session token verbatim as `Authorization`
//! - **Response**: any status >= 400 clears the session and forces the
//!   login route before the error reaches the caller
//!
//! The response side is a standalone [`ResponseInterceptor`] so simulated
//! backends can report statuses through the same path.

use crate::error::ServiceError;
use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Whether a response status invalidates the session
///
/// Every 4xx and 5xx status does.
pub fn invalidates_session(status: u16) -> bool {
    status >= 400
}

/// Response-side interceptor
#[derive(Clone)]
pub struct ResponseInterceptor {
    session: SessionStore,
    navigator: Navigator,
}

impl ResponseInterceptor {
    pub fn new(session: SessionStore, navigator: Navigator) -> Self {
        Self { session, navigator }
    }

    /// Inspect a response status, invalidating the session on failure
    pub fn observe(&self, status: u16) -> Result<(), ServiceError> {
        if invalidates_session(status) {
            warn!("Request failed with status {}, invalidating session", status);
            self.invalidate();
            return Err(ServiceError::Status(status));
        }
        Ok(())
    }

    /// Drop the session and send the user to the login screen
    pub fn invalidate(&self) {
        // clear() logs storage failures itself; the in-memory token is gone either way
        let _ = self.session.clear();
        self.navigator.force(Route::Login);
    }
}

/// Authenticated API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    interceptor: ResponseInterceptor,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore, navigator: Navigator) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            interceptor: ResponseInterceptor::new(session.clone(), navigator),
            session,
        }
    }

    /// Use a preconfigured reqwest client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn interceptor(&self) -> &ResponseInterceptor {
        &self.interceptor
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Start a request with the session token attached
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.header(AUTHORIZATION, token),
            None => builder,
        }
    }

    /// Send a request through the response interceptor
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ServiceError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        debug!("{} -> {}", response.url().path(), response.status());
        self.interceptor.observe(response.status().as_u16())?;
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ServiceError> {
        let response = self
            .send(self.request(Method::POST, path).multipart(form))
            .await?;
        Ok(response.json::<T>().await?)
    }
}
