//! Resource directory with a grant-scoped cache

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::resource::{
    Resource, ResourceId, ResourceStore, SuggestedField, SuggestedFieldId,
};
use crate::domain::DomainError;

/// Request for creating a new resource
#[derive(Debug, Clone)]
pub struct CreateResourceRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Request for updating a resource
#[derive(Debug, Clone)]
pub struct UpdateResourceRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Resource directory holding the list of resources visible under the
/// current grant scope.
///
/// The cached list is replaced wholesale by [`load_all`](Self::load_all)
/// and [`rescope`](Self::rescope); a failed replacement leaves the
/// previous list untouched. Mutations keep the cache coherent without a
/// full reload.
#[derive(Debug)]
pub struct ResourceDirectory<S: ResourceStore> {
    store: Arc<S>,
    cached: RwLock<Vec<Resource>>,
}

impl<S: ResourceStore> ResourceDirectory<S> {
    /// Create a new resource directory with an empty cache
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cached: RwLock::new(Vec::new()),
        }
    }

    /// The currently visible resources
    pub async fn cached(&self) -> Vec<Resource> {
        self.cached.read().await.clone()
    }

    /// Load every resource in the directory and make it the visible set
    pub async fn load_all(&self) -> Result<Vec<Resource>, DomainError> {
        let resources = self.store.list().await?;

        debug!(count = resources.len(), "Loaded full resource directory");
        *self.cached.write().await = resources.clone();

        Ok(resources)
    }

    /// Replace the visible set with exactly the given grant scope.
    ///
    /// Resources are fetched in a stable id order; any missing id or
    /// fetch failure aborts the whole replacement.
    pub async fn rescope(
        &self,
        granted: &HashSet<ResourceId>,
    ) -> Result<Vec<Resource>, DomainError> {
        let mut ids: Vec<&ResourceId> = granted.iter().collect();
        ids.sort();

        let fetches = ids.iter().map(|id| async move {
            self.store.get(id).await?.ok_or_else(|| {
                DomainError::not_found(format!("Resource '{}' not found", id))
            })
        });
        let resources = try_join_all(fetches).await?;

        debug!(count = resources.len(), "Rescoped visible resources");
        *self.cached.write().await = resources.clone();

        Ok(resources)
    }

    /// Get a resource by ID
    pub async fn get(&self, id: &str) -> Result<Option<Resource>, DomainError> {
        let resource_id =
            ResourceId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.store.get(&resource_id).await
    }

    /// Create a new resource with a generated ID
    pub async fn create(&self, request: CreateResourceRequest) -> Result<Resource, DomainError> {
        info!(name = %request.name, "Creating resource");

        let mut resource = Resource::new(ResourceId::generate(), &request.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        if let Some(description) = request.description {
            resource = resource.with_description(description);
        }

        let created = self.store.create(resource).await?;

        let mut cached = self.cached.write().await;
        cached.push(created.clone());
        cached.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(created)
    }

    /// Update a resource
    pub async fn update(
        &self,
        id: &str,
        request: UpdateResourceRequest,
    ) -> Result<Resource, DomainError> {
        info!(id = %id, "Updating resource");

        let resource_id =
            ResourceId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        if self.store.get(&resource_id).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Resource '{}' not found",
                id
            )));
        }

        let mut resource = Resource::new(resource_id, &request.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        if let Some(description) = request.description {
            resource = resource.with_description(description);
        }

        let updated = self.store.update(resource).await?;

        let mut cached = self.cached.write().await;
        if let Some(entry) = cached.iter_mut().find(|r| r.id() == updated.id()) {
            *entry = updated.clone();
            cached.sort_by(|a, b| a.name().cmp(b.name()));
        }

        Ok(updated)
    }

    /// Delete a resource
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        info!(id = %id, "Deleting resource");

        let resource_id =
            ResourceId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        let deleted = self.store.delete(&resource_id).await?;

        if deleted {
            self.cached.write().await.retain(|r| r.id() != &resource_id);
        }

        Ok(deleted)
    }

    /// List a resource's suggested rule fields
    pub async fn list_suggested_fields(
        &self,
        resource_id: &str,
    ) -> Result<Vec<SuggestedField>, DomainError> {
        let resource_id =
            ResourceId::new(resource_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.store.list_suggested_fields(&resource_id).await
    }

    /// Add a suggested rule field to a resource
    pub async fn add_suggested_field(
        &self,
        resource_id: &str,
        name: &str,
    ) -> Result<SuggestedField, DomainError> {
        info!(resource = %resource_id, field = %name, "Adding suggested field");

        let resource_id =
            ResourceId::new(resource_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        let field = SuggestedField::new(SuggestedFieldId::generate(), name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        self.store.add_suggested_field(&resource_id, field).await
    }

    /// Remove a suggested rule field from a resource
    pub async fn remove_suggested_field(
        &self,
        resource_id: &str,
        field_id: &str,
    ) -> Result<bool, DomainError> {
        info!(resource = %resource_id, field = %field_id, "Removing suggested field");

        let resource_id =
            ResourceId::new(resource_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        let field_id =
            SuggestedFieldId::new(field_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        self.store.remove_suggested_field(&resource_id, &field_id).await
    }
}
