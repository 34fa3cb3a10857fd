use async_trait::async_trait;
use uuid::Uuid;

use crate::api::{ApiClient, ApiError};
use crate::models::{CredentialRecord, ProfileRecord};

/// Read-only access to employee profile records
#[async_trait(?Send)]
pub trait ProfileStore {
    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, ApiError>;

    async fn get_name_by_employee_id(&self, employee_id: &str) -> Result<Option<CredentialRecord>, ApiError>;
}

/// PostgREST-style table API
pub struct RestProfileStore {
    client: ApiClient,
}

impl RestProfileStore {
    pub fn new(client: ApiClient) -> Self {
        RestProfileStore { client }
    }

    /// First row of a filtered select, or none
    async fn maybe_single<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let rows: Vec<T> = self.client.get(path).await?;
        Ok(rows.into_iter().next())
    }
}

pub fn profile_path(user_id: Uuid) -> String {
    format!("/rest/v1/profiles?select=employee_id,role,created_at&id=eq.{}", user_id)
}

pub fn credentials_path(employee_id: &str) -> String {
    let encoded: String = employee_id
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect();
    format!("/rest/v1/user_credentials?select=name&employee_id=eq.{}", encoded)
}

#[async_trait(?Send)]
impl ProfileStore for RestProfileStore {
    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, ApiError> {
        self.maybe_single(&profile_path(user_id)).await
    }

    async fn get_name_by_employee_id(&self, employee_id: &str) -> Result<Option<CredentialRecord>, ApiError> {
        self.maybe_single(&credentials_path(employee_id)).await
    }
}
