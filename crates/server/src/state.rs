//! Application state shared across handlers.

use std::sync::Arc;

use mongodb::Database;

use crate::config::ServerConfig;
use crate::services::geocoder::{Geocoder, GeocoderError};
use crate::services::images::{ImageStore, ImageStoreError};
use crate::services::notifier::{NotifierClient, NotifierError};

/// Error building the collaborator clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("notifier client: {0}")]
    Notifier(#[from] NotifierError),
    #[error("geocoder client: {0}")]
    Geocoder(#[from] GeocoderError),
    #[error("image store client: {0}")]
    Images(#[from] ImageStoreError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the document store handle and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    db: Database,
    notifier: Option<NotifierClient>,
    geocoder: Geocoder,
    images: Option<ImageStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `db` - Selected `MongoDB` database handle
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator client fails to build.
    pub fn new(config: ServerConfig, db: Database) -> Result<Self, StateError> {
        let notifier = config
            .notifier
            .as_ref()
            .map(NotifierClient::new)
            .transpose()?;
        let geocoder = Geocoder::new(&config.geocoder)?;
        let images = config.images.as_ref().map(ImageStore::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                notifier,
                geocoder,
                images,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the document store handle.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get the notifier client, if one is configured.
    #[must_use]
    pub fn notifier(&self) -> Option<&NotifierClient> {
        self.inner.notifier.as_ref()
    }

    /// Get a reference to the geocoder client.
    #[must_use]
    pub fn geocoder(&self) -> &Geocoder {
        &self.inner.geocoder
    }

    /// Get the image store client, if one is configured.
    #[must_use]
    pub fn images(&self) -> Option<&ImageStore> {
        self.inner.images.as_ref()
    }
}
