//! HTTP client for the task API.

use std::sync::Arc;

use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use todo_core::{
    AccessToken, Credentials, DurableStorage, NewTask, PasswordChange, ProfileUpdate,
    Registration, Task, TaskId, TaskPatch, TaskUpdate, TokenPair, User,
};
use tracing::{debug, error, info};

use crate::config::ApiConfig;
use crate::credentials::{TokenSource, resolve_bearer};
use crate::error::{GatewayError, GatewayResult};

/// How the `Authorization` header of a request is chosen.
enum Bearer<'a> {
    /// Memory, then durable storage, else no header.
    Resolve,
    /// Use exactly this token.
    Explicit(&'a AccessToken),
    /// Never send one.
    Anonymous,
}

/// Gateway to the remote task API.
#[derive(Clone)]
pub struct Gateway {
    http: Client,
    config: ApiConfig,
    session: Arc<dyn TokenSource>,
    storage: Arc<dyn DurableStorage>,
}

impl Gateway {
    /// Build a gateway reading the in-memory token from `session` and falling
    /// back to `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(
        config: ApiConfig,
        session: Arc<dyn TokenSource>,
        storage: Arc<dyn DurableStorage>,
    ) -> GatewayResult<Self> {
        let mut builder = Client::builder();

        // Timeout is not supported in WASM builds
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config,
            session,
            storage,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Exchange username and password for an access/refresh pair.
    pub async fn obtain_token(&self, credentials: &Credentials) -> GatewayResult<TokenPair> {
        let response = self
            .send(Method::POST, "token/", Some(credentials), Bearer::Anonymous)
            .await?;
        info!("Obtained token pair for {}", credentials.username);
        Self::decode(response).await
    }

    /// Fetch the profile of the token's owner.
    ///
    /// With `token` set the header is built from it alone, which is what login
    /// needs before the session holds the new token.
    pub async fn current_user(&self, token: Option<&AccessToken>) -> GatewayResult<User> {
        let bearer = token.map_or(Bearer::Resolve, Bearer::Explicit);
        let response = self
            .send(Method::GET, "users/me/", None::<&()>, bearer)
            .await?;
        Self::decode(response).await
    }

    /// Returns the name fields as stored by the server.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> GatewayResult<ProfileUpdate> {
        let response = self
            .send(Method::PATCH, "users/me/update/", Some(update), Bearer::Resolve)
            .await?;
        Self::decode(response).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> GatewayResult<()> {
        self.send(Method::PUT, "users/me/password/", Some(change), Bearer::Resolve)
            .await?;
        info!("Password changed");
        Ok(())
    }

    pub async fn register(&self, registration: &Registration) -> GatewayResult<User> {
        let response = self
            .send(Method::POST, "register/", Some(registration), Bearer::Anonymous)
            .await?;
        Self::decode(response).await
    }

    pub async fn list_tasks(&self) -> GatewayResult<Vec<Task>> {
        let response = self
            .send(Method::GET, "tasks/", None::<&()>, Bearer::Resolve)
            .await?;
        Self::decode(response).await
    }

    pub async fn create_task(&self, task: &NewTask) -> GatewayResult<Task> {
        let response = self
            .send(Method::POST, "tasks/", Some(task), Bearer::Resolve)
            .await?;
        Self::decode(response).await
    }

    pub async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> GatewayResult<TaskUpdate> {
        let path = format!("tasks/{id}/");
        let response = self
            .send(Method::PATCH, &path, Some(patch), Bearer::Resolve)
            .await?;
        Self::decode(response).await
    }

    pub async fn delete_task(&self, id: TaskId) -> GatewayResult<()> {
        let path = format!("tasks/{id}/");
        self.send(Method::DELETE, &path, None::<&()>, Bearer::Resolve)
            .await?;
        Ok(())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Bearer<'_>,
    ) -> GatewayResult<Response> {
        let url = self.config.endpoint(path)?;

        let token = match bearer {
            Bearer::Resolve => resolve_bearer(self.session.as_ref(), self.storage.as_ref()),
            Bearer::Explicit(token) => Some(token.clone()),
            Bearer::Anonymous => None,
        };

        debug!(
            "{} {} (authenticated: {})",
            method,
            url.path(),
            token.is_some()
        );

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = &token {
            request = request.bearer_auth(token.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("{} {} failed: {}", method, path, e);
            GatewayError::from(e)
        })?;

        Self::ensure_success(response).await
    }

    /// Returns the response on success; otherwise its status and body.
    async fn ensure_success(response: Response) -> GatewayResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        debug!("Request rejected with status {}", status);
        Err(GatewayError::Status { status, body })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
