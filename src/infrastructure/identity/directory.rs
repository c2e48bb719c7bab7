//! Identity directory for account and session management

use std::sync::Arc;

use tracing::info;

use crate::domain::identity::{
    validate_password, Identity, IdentityFilter, IdentityId, IdentityStore,
};
use crate::domain::DomainError;

/// Request for creating a new identity
#[derive(Debug, Clone)]
pub struct CreateIdentityRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_administrator: bool,
    pub must_change_password: bool,
}

/// Request for updating an identity
#[derive(Debug, Clone)]
pub struct UpdateIdentityRequest {
    pub name: String,
    pub email: String,
    /// Replacement credential; `None` keeps the current one
    pub password: Option<String>,
    pub is_administrator: bool,
    pub must_change_password: bool,
}

/// Request for self-service registration
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Identity directory for account management and sessions
#[derive(Debug)]
pub struct IdentityDirectory<S: IdentityStore> {
    store: Arc<S>,
}

impl<S: IdentityStore> IdentityDirectory<S> {
    /// Create a new identity directory
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List identities matching the filter
    pub async fn list(&self, filter: &IdentityFilter) -> Result<Vec<Identity>, DomainError> {
        // An empty id selection can never match; skip the store round trip
        if filter.is_empty_selection() {
            return Ok(Vec::new());
        }

        self.store.list(filter).await
    }

    /// Get an identity by ID
    pub async fn get(&self, id: &str) -> Result<Option<Identity>, DomainError> {
        let identity_id =
            IdentityId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.store.get(&identity_id).await
    }

    /// Look up an identity by email
    pub async fn lookup_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        self.store.lookup_by_email(email).await
    }

    /// Create a new identity
    pub async fn create(&self, request: CreateIdentityRequest) -> Result<Identity, DomainError> {
        info!(email = %request.email, "Creating identity");

        // Validate the credential before minting an ID
        validate_password(&request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        // Build the identity
        let identity = Identity::new(IdentityId::generate(), &request.name, &request.email)
            .map_err(|e| DomainError::validation(e.to_string()))?
            .with_administrator(request.is_administrator)
            .with_must_change_password(request.must_change_password);

        self.store.create(identity, &request.password).await
    }

    /// Update an identity
    pub async fn update(
        &self,
        id: &str,
        request: UpdateIdentityRequest,
    ) -> Result<Identity, DomainError> {
        info!(id = %id, "Updating identity");

        let identity_id =
            IdentityId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        let mut identity = self
            .store
            .get(&identity_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Identity '{}' not found", id)))?;

        identity
            .set_name(&request.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        identity
            .set_email(&request.email)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        identity.set_administrator(request.is_administrator);
        identity.set_must_change_password(request.must_change_password);

        if let Some(password) = &request.password {
            validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;
        }

        self.store.update(identity, request.password.as_deref()).await
    }

    /// Delete an identity
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        info!(id = %id, "Deleting identity");

        let identity_id =
            IdentityId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.store.delete(&identity_id).await
    }

    /// Register a new non-administrator identity
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Identity, DomainError> {
        info!(email = %request.email, "Signing up identity");

        // The confirmation must match before anything reaches the store
        if request.password != request.password_confirmation {
            return Err(DomainError::validation(
                "Password and confirmation password don't match",
            ));
        }

        self.create(CreateIdentityRequest {
            name: request.name,
            email: request.email,
            password: request.password,
            is_administrator: false,
            must_change_password: false,
        })
        .await
    }

    /// Establish a session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, DomainError> {
        info!(email = %email, "Signing in");
        self.store.sign_in(email, password).await
    }

    /// Tear down the current session
    pub async fn sign_out(&self) -> Result<(), DomainError> {
        info!("Signing out");
        self.store.sign_out().await
    }

    /// Replace an identity's credential and clear the forced-change flag
    pub async fn change_password(
        &self,
        id: &str,
        new_password: &str,
        new_password_confirmation: &str,
    ) -> Result<Identity, DomainError> {
        info!(id = %id, "Changing identity password");

        let identity_id =
            IdentityId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        if new_password != new_password_confirmation {
            return Err(DomainError::validation(
                "Password and confirmation password don't match",
            ));
        }
        validate_password(new_password).map_err(|e| DomainError::validation(e.to_string()))?;

        let mut identity = self
            .store
            .get(&identity_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Identity '{}' not found", id)))?;

        identity.set_must_change_password(false);

        self.store.update(identity, Some(new_password)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::backend::InMemoryBackend;

    fn create_directory() -> IdentityDirectory<InMemoryBackend> {
        IdentityDirectory::new(Arc::new(InMemoryBackend::new()))
    }

    fn make_request(name: &str, email: &str) -> CreateIdentityRequest {
        CreateIdentityRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "secure_password123".to_string(),
            is_administrator: false,
            must_change_password: false,
        }
    }

    #[tokio::test]
    async fn test_create_identity() {
        let directory = create_directory();

        let identity = directory
            .create(make_request("User One", "u1@example.com"))
            .await
            .unwrap();

        assert_eq!(identity.name(), "User One");
        assert_eq!(identity.email(), "u1@example.com");
        assert!(!identity.is_administrator());
    }

    #[tokio::test]
    async fn test_create_identity_short_password() {
        let directory = create_directory();

        let mut request = make_request("User One", "u1@example.com");
        request.password = "short".to_string();

        let result = directory.create(request).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let directory = create_directory();

        directory
            .create(make_request("User One", "same@example.com"))
            .await
            .unwrap();

        let result = directory
            .create(make_request("User Two", "same@example.com"))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_identity() {
        let directory = create_directory();

        let created = directory
            .create(make_request("User One", "u1@example.com"))
            .await
            .unwrap();

        let updated = directory
            .update(
                created.id().as_str(),
                UpdateIdentityRequest {
                    name: "Renamed".to_string(),
                    email: "renamed@example.com".to_string(),
                    password: None,
                    is_administrator: true,
                    must_change_password: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name(), "Renamed");
        assert_eq!(updated.email(), "renamed@example.com");
        assert!(updated.is_administrator());
        assert!(updated.must_change_password());
    }

    #[tokio::test]
    async fn test_update_missing_identity() {
        let directory = create_directory();

        let result = directory
            .update(
                "ghost",
                UpdateIdentityRequest {
                    name: "Ghost".to_string(),
                    email: "ghost@example.com".to_string(),
                    password: None,
                    is_administrator: false,
                    must_change_password: false,
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_sign_up_mismatched_confirmation() {
        let directory = create_directory();

        let result = directory
            .sign_up(SignUpRequest {
                name: "User One".to_string(),
                email: "u1@example.com".to_string(),
                password: "secure_password123".to_string(),
                password_confirmation: "different_password".to_string(),
            })
            .await;

        let error = result.unwrap_err();
        assert!(matches!(error, DomainError::Validation { .. }));
        assert_eq!(error.message(), "Password and confirmation password don't match");
    }

    #[tokio::test]
    async fn test_sign_up_creates_regular_identity() {
        let directory = create_directory();

        let identity = directory
            .sign_up(SignUpRequest {
                name: "User One".to_string(),
                email: "u1@example.com".to_string(),
                password: "secure_password123".to_string(),
                password_confirmation: "secure_password123".to_string(),
            })
            .await
            .unwrap();

        assert!(!identity.is_administrator());
        assert!(!identity.must_change_password());
    }

    #[tokio::test]
    async fn test_change_password_clears_forced_change() {
        let directory = create_directory();

        let mut request = make_request("User One", "u1@example.com");
        request.must_change_password = true;
        let created = directory.create(request).await.unwrap();

        let updated = directory
            .change_password(created.id().as_str(), "fresh_password456", "fresh_password456")
            .await
            .unwrap();
        assert!(!updated.must_change_password());

        // The new credential works for sign-in
        let signed_in = directory
            .sign_in("u1@example.com", "fresh_password456")
            .await
            .unwrap();
        assert_eq!(signed_in.id(), created.id());
    }

    #[tokio::test]
    async fn test_change_password_mismatched_confirmation() {
        let directory = create_directory();

        let created = directory
            .create(make_request("User One", "u1@example.com"))
            .await
            .unwrap();

        let result = directory
            .change_password(created.id().as_str(), "fresh_password456", "something_else789")
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        // The old credential still signs in
        let signed_in = directory
            .sign_in("u1@example.com", "secure_password123")
            .await
            .unwrap();
        assert_eq!(signed_in.id(), created.id());
    }

    #[tokio::test]
    async fn test_empty_selection_never_reaches_the_store() {
        let backend = Arc::new(InMemoryBackend::new());
        let directory = IdentityDirectory::new(backend.clone());
        backend.set_unavailable(true);

        let identities = directory
            .list(&IdentityFilter::ids(Vec::new()))
            .await
            .unwrap();
        assert!(identities.is_empty());
    }

    #[tokio::test]
    async fn test_get_with_invalid_id() {
        let directory = create_directory();

        let result = directory.get("not a valid id!").await;
        assert!(matches!(result, Err(DomainError::InvalidId { .. })));
    }

    #[tokio::test]
    async fn test_delete_identity() {
        let directory = create_directory();

        let created = directory
            .create(make_request("User One", "u1@example.com"))
            .await
            .unwrap();

        assert!(directory.delete(created.id().as_str()).await.unwrap());
        assert!(directory.get(created.id().as_str()).await.unwrap().is_none());
    }
}
