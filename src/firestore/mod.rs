//! Document database admin access (Firestore).
//!
//! [`DocumentStore`] is the process-wide handle. It is created empty at
//! startup and initialized at most once from the service-account settings;
//! a failed initialization is logged and the store stays unavailable, so
//! every operation returns [`DocumentStoreError::NotInitialized`].

pub mod client;
pub mod credentials;
pub mod value;

use crate::config::FirebaseSettings;
use client::FirestoreClient;
use credentials::ServiceAccount;
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("document store is not initialized")]
    NotInitialized,

    #[error("missing {0}")]
    MissingSetting(&'static str),

    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    #[error("document store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} - {status}, {message}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },
}

#[derive(Default)]
pub struct DocumentStore {
    client: OnceCell<Arc<FirestoreClient>>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the admin client on first call; later calls return the same
    /// client without touching the settings.
    ///
    /// # Errors
    /// Returns an error if the service account settings are incomplete or
    /// the private key cannot be parsed.
    pub fn try_initialize(
        &self,
        settings: &FirebaseSettings,
        http: reqwest::Client,
    ) -> Result<Arc<FirestoreClient>, DocumentStoreError> {
        self.client
            .get_or_try_init(|| {
                let account = ServiceAccount::from_settings(settings)
                    .map_err(DocumentStoreError::MissingSetting)?;
                let client = FirestoreClient::new(
                    account,
                    &settings.firestore_url,
                    &settings.token_url,
                    http,
                )?;
                info!("Firestore admin client ready for project {}", client.project_id());
                Ok(Arc::new(client))
            })
            .cloned()
    }

    /// Initialize, logging and swallowing any failure.
    pub fn initialize(&self, settings: &FirebaseSettings, http: reqwest::Client) {
        if let Err(e) = self.try_initialize(settings, http) {
            error!("Firebase admin initialization error: {}", e);
        }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    fn client(&self) -> Result<&FirestoreClient, DocumentStoreError> {
        self.client
            .get()
            .map(AsRef::as_ref)
            .ok_or(DocumentStoreError::NotInitialized)
    }

    /// Fetch `collection/id`; `None` when the document does not exist.
    ///
    /// # Errors
    /// Returns an error if the store is not initialized or the request fails.
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Map<String, Value>>, DocumentStoreError> {
        self.client()?.get(collection, id).await
    }

    /// # Errors
    /// Returns an error if the store is not initialized or the request fails.
    pub async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<(), DocumentStoreError> {
        self.client()?.set(collection, id, data).await
    }

    /// # Errors
    /// Returns an error if the store is not initialized or the request fails.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError> {
        self.client()?.delete(collection, id).await
    }
}
