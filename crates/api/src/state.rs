use std::sync::Arc;

use sanjesh_core::attachments::AttachmentStore;
use sanjesh_core::lookup_cache::LookupCache;
use sanjesh_core::types::DbId;
use sanjesh_db::models::geography::{District, ExamCenter, Province};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sanjesh_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Blob store for file-field attachments.
    pub attachments: Arc<dyn AttachmentStore>,
    /// Read-through caches for geography lookups.
    pub lookups: Arc<GeoLookups>,
}

/// Geography lookups keyed by parent id.
#[derive(Debug, Default)]
pub struct GeoLookups {
    pub provinces: LookupCache<(), Province>,
    pub districts: LookupCache<DbId, District>,
    pub exam_centers: LookupCache<DbId, ExamCenter>,
}

impl GeoLookups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached lookup so the next request reloads it.
    pub async fn clear(&self) {
        self.provinces.clear().await;
        self.districts.clear().await;
        self.exam_centers.clear().await;
    }
}
