use std::sync::Arc;

use anyhow::{Context, Error};
use dataset::{Dataset, ObjectLocation, ObjectStore, load_remote};

use super::{
    config::{CachePolicy, Config},
    error::AppError,
};

pub struct AppState {
    pub config: Config,
    pub store: ObjectStore,
    pub location: ObjectLocation,
}

impl AppState {
    /// Builds the store client from the standard AWS credential chain.
    pub async fn new(config: Config) -> Result<Arc<Self>, Error> {
        let store =
            ObjectStore::from_env(config.object_store_endpoint.as_deref(), config.fetch_timeout)
                .await
                .context("Failed to build object store client")?;

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: ObjectStore) -> Arc<Self> {
        let location = ObjectLocation {
            bucket: config.bucket.clone(),
            key: config.key.clone(),
        };

        Arc::new(Self {
            config,
            store,
            location,
        })
    }

    pub async fn load_dataset(&self) -> Result<Dataset, AppError> {
        match self.config.cache {
            CachePolicy::Disabled => Ok(load_remote(&self.store, &self.location).await?),
        }
    }
}
