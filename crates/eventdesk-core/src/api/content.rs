//! CRUD over dashboard content, routed through the gateway.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::gateway::Gateway;
use super::transport::{ApiRequest, ApiResponse, FormPart};
use super::ApiError;
use crate::models::{ContentKind, Event};

/// Participant-scoped events path
fn participant_events_path(subject_id: &str) -> String {
    format!("{}events/", ContentKind::Participants.item_path(subject_id))
}

#[derive(Clone)]
pub struct ContentClient {
    gateway: Arc<Gateway>,
}

impl ContentClient {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Unwrap a `{success, data}` envelope from a non-401 response
    fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
        response.error_for_status()?.envelope::<T>()?.into_result()
    }

    pub async fn list(&self, kind: ContentKind) -> Result<Vec<Value>, ApiError> {
        let response = self
            .gateway
            .authenticated_fetch(ApiRequest::get(kind.collection_path()))
            .await?;
        let items: Vec<Value> = Self::decode(response)?;
        debug!(kind = kind.slug(), count = items.len(), "Listed content");
        Ok(items)
    }

    pub async fn get(&self, kind: ContentKind, id: &str) -> Result<Value, ApiError> {
        let response = self
            .gateway
            .authenticated_fetch(ApiRequest::get(kind.item_path(id)))
            .await?;
        Self::decode(response)
    }

    pub async fn create(&self, kind: ContentKind, fields: Value) -> Result<Value, ApiError> {
        let response = self
            .gateway
            .authenticated_fetch(ApiRequest::post(kind.collection_path(), fields))
            .await?;
        Self::decode(response)
    }

    pub async fn update(&self, kind: ContentKind, id: &str, fields: Value) -> Result<Value, ApiError> {
        let response = self
            .gateway
            .authenticated_fetch(ApiRequest::put(kind.item_path(id), fields))
            .await?;
        Self::decode(response)
    }

    /// Create a record that carries files (gallery images, service banners)
    pub async fn create_with_files(&self, kind: ContentKind, parts: Vec<FormPart>) -> Result<Value, ApiError> {
        let request = ApiRequest::multipart(Method::POST, kind.collection_path(), parts);
        let response = self.gateway.upload(request).await?;
        Self::decode(response)
    }

    pub async fn update_with_files(
        &self,
        kind: ContentKind,
        id: &str,
        parts: Vec<FormPart>,
    ) -> Result<Value, ApiError> {
        let request = ApiRequest::multipart(Method::PUT, kind.item_path(id), parts);
        let response = self.gateway.upload(request).await?;
        Self::decode(response)
    }

    pub async fn delete(&self, kind: ContentKind, id: &str) -> Result<(), ApiError> {
        let response = self
            .gateway
            .authenticated_fetch(ApiRequest::delete(kind.item_path(id)))
            .await?
            .error_for_status()?;

        if response.status == StatusCode::NO_CONTENT || response.body.is_empty() {
            return Ok(());
        }
        response.envelope::<Value>()?.into_unit()?;
        debug!(kind = kind.slug(), id, "Deleted content");
        Ok(())
    }

    /// Events the logged-in participant is registered for
    pub async fn my_events(&self) -> Result<Vec<Event>, ApiError> {
        let subject_id = self
            .gateway
            .session()
            .subject_id()
            .ok_or(ApiError::NotAuthenticated)?;

        let response = self
            .gateway
            .authenticated_fetch(ApiRequest::get(participant_events_path(&subject_id)))
            .await?;
        Self::decode(response)
    }
}
