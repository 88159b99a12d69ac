//! [`CommissionStore`] over the ArtTrack HTTP API.

use std::future::Future;
use std::sync::Arc;

use arttrack_core::commission::{Commission, NewCommission};
use arttrack_core::error::StoreError;
use arttrack_core::status::CommissionStatus;
use arttrack_core::store::CommissionStore;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::api::{ApiClient, ApiError, DataResponse};
use crate::identity::HttpIdentityProvider;

pub struct HttpCommissionStore {
    api: Arc<ApiClient>,
    /// Renews an expired access token; without it a 401 is returned as is.
    session: Option<Arc<HttpIdentityProvider>>,
}

impl HttpCommissionStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api, session: None }
    }

    pub fn with_session(mut self, session: Arc<HttpIdentityProvider>) -> Self {
        self.session = Some(session);
        self
    }

    /// Run `call`; on a 401 renew the session once and run it again.
    async fn authorized<T, F, Fut>(&self, call: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let sent_with = self.api.access_token().await;
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        let Some(session) = self.session.as_ref().filter(|_| err.is_unauthorized()) else {
            return Err(err.into());
        };

        if let Err(refresh_err) = session.refresh_after(sent_with.as_deref()).await {
            tracing::info!(error = %refresh_err, "Access token could not be renewed");
            return Err(err.into());
        }
        tracing::debug!("Retrying with renewed access token");
        Ok(call().await?)
    }
}

#[async_trait]
impl CommissionStore for HttpCommissionStore {
    async fn list_all(&self) -> Result<Vec<Commission>, StoreError> {
        self.authorized(move || self.api.get_data("/commissions", &[]))
            .await
    }

    async fn list_for_owner(&self, artist_id: &str) -> Result<Vec<Commission>, StoreError> {
        let query = [("artist_id", artist_id)];
        let query = &query[..];
        self.authorized(move || self.api.get_data("/commissions", query))
            .await
    }

    async fn create(&self, data: NewCommission) -> Result<Commission, StoreError> {
        let data = &data;
        let created: DataResponse<Commission> = self
            .authorized(move || self.api.send_json(Method::POST, "/commissions", data))
            .await?;
        tracing::debug!(commission_id = %created.data.id, "Commission created remotely");
        Ok(created.data)
    }

    async fn set_status(&self, id: &str, status: CommissionStatus) -> Result<(), StoreError> {
        let path = format!("/commissions/{id}/status");
        let body = json!({ "status": status });
        let (path, body) = (path.as_str(), &body);
        self.authorized(move || self.api.send_empty(Method::PATCH, path, Some(body)))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = format!("/commissions/{id}");
        let path = path.as_str();
        self.authorized(move || self.api.send_empty::<()>(Method::DELETE, path, None))
            .await
    }
}
