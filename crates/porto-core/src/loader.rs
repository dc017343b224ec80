//! Loads the seven documents of a link validation run.
//!
//! Loading stops at the first missing or malformed document. The failure is
//! not a `PortoError`: the validator turns it into a single error finding and
//! skips every rule.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::DataFiles;
use crate::model::{
    DataLinksDoc, DimensionsDoc, DocumentKind, PricesDoc, ProductsDoc, ServicesDoc,
    WeightTiersDoc, ZonesDoc,
};

/// Immutable documents owned by one validation run.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    pub data_links: DataLinksDoc,
    pub products: ProductsDoc,
    pub zones: ZonesDoc,
    pub weight_tiers: WeightTiersDoc,
    pub services: ServicesDoc,
    pub prices: PricesDoc,
    pub dimensions: DimensionsDoc,
}

#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("Missing file: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Invalid JSON: {}: {detail}", path.display())]
    Invalid { path: PathBuf, detail: String },

    #[error("Unreadable file: {}: {detail}", path.display())]
    Unreadable { path: PathBuf, detail: String },
}

impl LoadFailure {
    pub fn path(&self) -> &Path {
        match self {
            Self::Missing { path } | Self::Invalid { path, .. } | Self::Unreadable { path, .. } => {
                path
            }
        }
    }
}

pub fn load_documents(dir: &Path, files: &DataFiles) -> Result<DocumentSet, LoadFailure> {
    let path = |kind: DocumentKind| dir.join(files.file_for(kind));
    Ok(DocumentSet {
        data_links: read_document(&path(DocumentKind::DataLinks))?,
        products: read_document(&path(DocumentKind::Products))?,
        zones: read_document(&path(DocumentKind::Zones))?,
        weight_tiers: read_document(&path(DocumentKind::WeightTiers))?,
        services: read_document(&path(DocumentKind::Services))?,
        prices: read_document(&path(DocumentKind::Prices))?,
        dimensions: read_document(&path(DocumentKind::Dimensions))?,
    })
}

/// Read and deserialize one document. Shape errors count as invalid JSON.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadFailure> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadFailure::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(LoadFailure::Unreadable {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|e| LoadFailure::Invalid {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
