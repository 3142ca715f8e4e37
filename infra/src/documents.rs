use anyhow::{Context, Result};
use err_derive::Error;
use log::*;
use serde::{de::DeserializeOwned, Serialize};

use crate::persistence::KeyValueStore;

#[derive(Debug, Error)]
#[error(display = "could not decode document at {:?}: {}", key, cause)]
pub struct DecodeError {
    pub key: String,
    pub cause: serde_json::Error,
}

/// JSON documents kept in a key-value store, one document per key.
#[derive(Debug, Clone)]
pub struct Documents<S> {
    store: S,
}

impl<S: KeyValueStore> Documents<S> {
    pub fn wrap(store: S) -> Self {
        Documents { store }
    }

    pub fn load<D: DeserializeOwned>(&self, key: &str) -> Result<Option<D>> {
        let bytes = match self.store.get(key).context("load document")? {
            Some(bytes) => bytes,
            None => {
                debug!("No document at {:?}", key);
                return Ok(None);
            }
        };
        let doc = serde_json::from_slice(&bytes).map_err(|cause| DecodeError {
            key: key.to_string(),
            cause,
        })?;
        Ok(Some(doc))
    }

    pub fn save<D: Serialize>(&self, key: &str, document: &D) -> Result<()> {
        let json = serde_json::to_vec(document).context("encode document")?;
        self.store.set(key, &json).context("save document")?;
        debug!("Saved {} bytes at {:?}", json.len(), key);
        Ok(())
    }
}
