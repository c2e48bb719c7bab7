//! HTTP backend
//!
//! Binds the store traits to the admin server's REST routes. Creates go
//! through PUT and updates through POST, matching the server's route
//! convention. Sessions ride the client's cookie jar, so one backend
//! instance represents one signed-in session.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::auth::{AuthorizationState, SessionStore};
use crate::domain::identity::{Identity, IdentityFilter, IdentityId, IdentityStore};
use crate::domain::resource::{Resource, ResourceId, ResourceStore, SuggestedField, SuggestedFieldId};
use crate::domain::team::{Team, TeamId, TeamStore};
use crate::domain::DomainError;

/// Characters that cannot ride raw in a single path segment.
///
/// Emails reach the lookup route as a path segment; `#`, `?`, and the
/// rest below would otherwise truncate the path into a fragment or
/// query when the URL is parsed.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Failure body shape shared by every route
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateIdentityBody<'a> {
    #[serde(flatten)]
    identity: &'a Identity,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateIdentityBody<'a> {
    #[serde(flatten)]
    identity: &'a Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

/// Real backend client using reqwest
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .cookie_store(true)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn error_from_response(response: reqwest::Response) -> DomainError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&body)
            .ok()
            .map(|m| m.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        match status {
            StatusCode::NOT_FOUND => DomainError::not_found(message),
            StatusCode::CONFLICT => DomainError::conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                DomainError::validation(message)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DomainError::unauthorized(message)
            }
            _ => DomainError::unavailable(format!("HTTP {}: {}", status, message)),
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, DomainError> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::unavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DomainError> {
        response
            .json()
            .await
            .map_err(|e| DomainError::internal(format!("Failed to parse response: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DomainError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        Self::decode(response).await
    }

    /// GET that treats 404 as an absent entity rather than a failure
    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, DomainError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| DomainError::unavailable(format!("Request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(Some(Self::decode(response).await?))
    }

    /// DELETE that reports whether the entity existed
    async fn delete_entity(&self, path: &str) -> Result<bool, DomainError> {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| DomainError::unavailable(format!("Request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(true)
    }

    /// PUT with an empty JSON body, used by the edge routes
    async fn put_edge(&self, path: &str) -> Result<(), DomainError> {
        self.send(self.client.put(self.url(path)).json(&serde_json::json!({})))
            .await?;
        Ok(())
    }

    async fn delete_edge(&self, path: &str) -> Result<(), DomainError> {
        self.send(self.client.delete(self.url(path))).await?;
        Ok(())
    }

    async fn list_identities(&self, filter: &IdentityFilter) -> Result<Vec<Identity>, DomainError> {
        // An explicit empty selection never needs the server
        if filter.is_empty_selection() {
            return Ok(Vec::new());
        }

        let mut request = self.client.get(self.url("identity"));

        if let IdentityFilter::Ids(ids) = filter {
            let params: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_str())).collect();
            request = request.query(&params);
        }

        let response = self.send(request).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl IdentityStore for HttpBackend {
    async fn list(&self, filter: &IdentityFilter) -> Result<Vec<Identity>, DomainError> {
        self.list_identities(filter).await
    }

    // The server has no single-identity route; a one-id filter does it
    async fn get(&self, id: &IdentityId) -> Result<Option<Identity>, DomainError> {
        let matches = self.list_identities(&IdentityFilter::ids([id.clone()])).await?;
        Ok(matches.into_iter().next())
    }

    async fn lookup_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        let email = utf8_percent_encode(email, PATH_SEGMENT);
        self.get_optional(&format!("identity/lookup/email/{}", email))
            .await
    }

    async fn create(&self, identity: Identity, credential: &str) -> Result<Identity, DomainError> {
        let body = CreateIdentityBody {
            identity: &identity,
            password: credential,
        };
        let response = self
            .send(self.client.put(self.url("identity")).json(&body))
            .await?;
        Self::decode(response).await
    }

    async fn update(
        &self,
        identity: Identity,
        credential: Option<&str>,
    ) -> Result<Identity, DomainError> {
        let body = UpdateIdentityBody {
            identity: &identity,
            password: credential,
        };
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("identity/{}", identity.id())))
                    .json(&body),
            )
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &IdentityId) -> Result<bool, DomainError> {
        self.delete_entity(&format!("identity/{}", id)).await
    }

    async fn sign_in(&self, email: &str, credential: &str) -> Result<Identity, DomainError> {
        let body = SignInBody {
            email,
            password: credential,
        };
        let response = self
            .send(self.client.post(self.url("auth-login")).json(&body))
            .await?;
        Self::decode(response).await
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        self.send(self.client.get(self.url("auth-logout"))).await?;
        Ok(())
    }
}

#[async_trait]
impl TeamStore for HttpBackend {
    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        self.get_json("team").await
    }

    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        self.get_optional(&format!("team/{}", id)).await
    }

    async fn create(&self, team: Team) -> Result<Team, DomainError> {
        let response = self
            .send(self.client.put(self.url("team")).json(&team))
            .await?;
        Self::decode(response).await
    }

    async fn update(&self, team: Team) -> Result<Team, DomainError> {
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("team/{}", team.id())))
                    .json(&team),
            )
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError> {
        self.delete_entity(&format!("team/{}", id)).await
    }

    async fn list_member_identity_ids(
        &self,
        team: &TeamId,
    ) -> Result<Vec<IdentityId>, DomainError> {
        self.get_json(&format!("team/{}/identity", team)).await
    }

    async fn add_identity_to_team(
        &self,
        identity: &IdentityId,
        team: &TeamId,
    ) -> Result<(), DomainError> {
        self.put_edge(&format!("identity/{}/team/{}", identity, team))
            .await
    }

    async fn remove_identity_from_team(
        &self,
        identity: &IdentityId,
        team: &TeamId,
    ) -> Result<(), DomainError> {
        self.delete_edge(&format!("identity/{}/team/{}", identity, team))
            .await
    }

    async fn list_granted_resource_ids(
        &self,
        team: &TeamId,
    ) -> Result<Vec<ResourceId>, DomainError> {
        self.get_json(&format!("team/{}/resource", team)).await
    }

    async fn grant_resource_to_team(
        &self,
        resource: &ResourceId,
        team: &TeamId,
    ) -> Result<(), DomainError> {
        self.put_edge(&format!("team/{}/resource/{}", team, resource))
            .await
    }

    async fn revoke_resource_from_team(
        &self,
        resource: &ResourceId,
        team: &TeamId,
    ) -> Result<(), DomainError> {
        self.delete_edge(&format!("team/{}/resource/{}", team, resource))
            .await
    }
}

#[async_trait]
impl ResourceStore for HttpBackend {
    async fn list(&self) -> Result<Vec<Resource>, DomainError> {
        self.get_json("resource").await
    }

    async fn get(&self, id: &ResourceId) -> Result<Option<Resource>, DomainError> {
        self.get_optional(&format!("resource/{}", id)).await
    }

    async fn create(&self, resource: Resource) -> Result<Resource, DomainError> {
        let response = self
            .send(self.client.put(self.url("resource")).json(&resource))
            .await?;
        Self::decode(response).await
    }

    async fn update(&self, resource: Resource) -> Result<Resource, DomainError> {
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("resource/{}", resource.id())))
                    .json(&resource),
            )
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &ResourceId) -> Result<bool, DomainError> {
        self.delete_entity(&format!("resource/{}", id)).await
    }

    async fn list_suggested_fields(
        &self,
        resource: &ResourceId,
    ) -> Result<Vec<SuggestedField>, DomainError> {
        self.get_json(&format!("resource/{}/suggested-field", resource))
            .await
    }

    async fn add_suggested_field(
        &self,
        resource: &ResourceId,
        field: SuggestedField,
    ) -> Result<SuggestedField, DomainError> {
        let response = self
            .send(
                self.client
                    .put(self.url(&format!("resource/{}/suggested-field", resource)))
                    .json(&field),
            )
            .await?;
        Self::decode(response).await
    }

    async fn remove_suggested_field(
        &self,
        resource: &ResourceId,
        field: &SuggestedFieldId,
    ) -> Result<bool, DomainError> {
        self.delete_entity(&format!("resource/{}/suggested-field/{}", resource, field))
            .await
    }
}

#[async_trait]
impl SessionStore for HttpBackend {
    async fn fetch_auth_snapshot(&self) -> Result<AuthorizationState, DomainError> {
        self.get_json("auth-info").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> HttpBackend {
        HttpBackend::new(server.uri(), Duration::from_secs(5))
    }

    fn identity_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "User One",
            "email": format!("{}@example.com", id),
            "isAdministrator": false,
            "mustChangePassword": false,
        })
    }

    #[tokio::test]
    async fn test_fetch_auth_snapshot_decodes_wire_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth-info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "signInRequired": true,
                "signedIn": true,
                "currentIdentity": {
                    "id": "u1",
                    "name": "Admin",
                    "email": "admin@example.com",
                    "isAdministrator": true,
                    "mustChangePassword": false,
                },
                "memberTeams": ["t1", "t2"],
                "grantedResources": ["r1"],
            })))
            .mount(&server)
            .await;

        let snapshot = backend(&server).fetch_auth_snapshot().await.unwrap();

        assert!(snapshot.is_signed_in());
        assert!(snapshot.is_administrator());
        assert_eq!(snapshot.member_teams().len(), 2);
        assert!(snapshot.has_grant(&ResourceId::new("r1").unwrap()));
    }

    #[tokio::test]
    async fn test_failure_message_is_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/team"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "result": "KO",
                "message": "Team with ID 't1' already exists",
            })))
            .mount(&server)
            .await;

        let team = Team::new(TeamId::new("t1").unwrap(), "Team One").unwrap();
        let error = TeamStore::create(&backend(&server), team).await.unwrap_err();

        assert!(matches!(error, DomainError::Conflict { .. }));
        assert_eq!(error.message(), "Team with ID 't1' already exists");
    }

    #[tokio::test]
    async fn test_missing_entities_map_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "result": "KO",
                "message": "Team 'ghost' not found",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/identity/lookup/email/nobody@example.com"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = backend(&server);

        let team = TeamStore::get(&backend, &TeamId::new("ghost").unwrap())
            .await
            .unwrap();
        assert!(team.is_none());

        let identity = backend.lookup_by_email("nobody@example.com").await.unwrap();
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn test_lookup_email_encodes_the_path_segment() {
        let server = MockServer::start().await;
        // Raw, `#` would start a fragment and truncate the route
        Mock::given(method("GET"))
            .and(path("/identity/lookup/email/we%23ird@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(identity_json("u1")))
            .mount(&server)
            .await;

        let identity = backend(&server)
            .lookup_by_email("we#ird@example.com")
            .await
            .unwrap();
        assert_eq!(identity.unwrap().id().as_str(), "u1");
    }

    #[tokio::test]
    async fn test_connection_failure_is_unavailable() {
        // A pooled MockServer keeps listening after drop, so grab a free
        // port from the OS and release it to guarantee a dead endpoint.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = HttpBackend::new(format!("http://{}", addr), Duration::from_secs(5));

        let error = backend.fetch_auth_snapshot().await.unwrap_err();
        assert!(error.is_unavailable());
    }

    #[tokio::test]
    async fn test_identity_list_sends_repeated_id_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/identity"))
            .and(query_param("id", "u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([identity_json("u1")])))
            .mount(&server)
            .await;

        let filter = IdentityFilter::ids([IdentityId::new("u1").unwrap()]);
        let identities = IdentityStore::list(&backend(&server), &filter).await.unwrap();

        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0].id().as_str(), "u1");
    }

    #[tokio::test]
    async fn test_empty_id_selection_skips_the_server() {
        // No mounted route: a request would fail with a connect refusal
        let server = MockServer::start().await;
        let backend = backend(&server);
        drop(server);

        let filter = IdentityFilter::ids(Vec::<IdentityId>::new());
        let identities = IdentityStore::list(&backend, &filter).await.unwrap();

        assert!(identities.is_empty());
    }

    #[tokio::test]
    async fn test_create_identity_sends_credential_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/identity"))
            .and(body_partial_json(json!({
                "email": "u1@example.com",
                "password": "secret-123",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(identity_json("u1")))
            .mount(&server)
            .await;

        let identity = Identity::new(
            IdentityId::new("u1").unwrap(),
            "User One",
            "u1@example.com",
        )
        .unwrap();
        let created = IdentityStore::create(&backend(&server), identity, "secret-123")
            .await
            .unwrap();

        assert_eq!(created.id().as_str(), "u1");
    }

    #[tokio::test]
    async fn test_sign_in_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-login"))
            .and(body_partial_json(json!({
                "email": "admin@example.com",
                "password": "secret-123",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(identity_json("u1")))
            .mount(&server)
            .await;

        let identity = backend(&server)
            .sign_in("admin@example.com", "secret-123")
            .await
            .unwrap();
        assert_eq!(identity.id().as_str(), "u1");
    }

    #[tokio::test]
    async fn test_sign_in_rejection_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "result": "KO",
                "message": "Invalid email or password",
            })))
            .mount(&server)
            .await;

        let error = backend(&server)
            .sign_in("admin@example.com", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(error, DomainError::Unauthorized { .. }));
        assert_eq!(error.message(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_membership_edge_routes() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/identity/u1/team/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "OK",
                "message": "",
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/identity/u1/team/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "OK",
                "message": "",
            })))
            .mount(&server)
            .await;

        let backend = backend(&server);
        let identity = IdentityId::new("u1").unwrap();
        let team = TeamId::new("t1").unwrap();

        backend.add_identity_to_team(&identity, &team).await.unwrap();
        backend
            .remove_identity_from_team(&identity, &team)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_reports_absence() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/resource/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "result": "KO",
                "message": "Resource 'ghost' not found",
            })))
            .mount(&server)
            .await;

        let deleted = ResourceStore::delete(&backend(&server), &ResourceId::new("ghost").unwrap())
            .await
            .unwrap();
        assert!(!deleted);
    }
}
