//! Drive v3 permissions client.
//!
//! Implements [`AccessControlClient`] on top of the `permissions` endpoints:
//! <https://developers.google.com/drive/api/v3/reference/permissions>

use crate::auth::{ServiceAccountKey, TokenProvider};
use crate::error::{Error, Result};
use log::{debug, warn};
use reconcile::{AccessControlClient, Entry, EntryKind, Role};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use ureq::Body;
use ureq::http::Response;

/// Drive API base URL.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested for a single permission.
const PERMISSION_FIELDS: &str = "id,type,role,emailAddress,domain";

/// Fields requested when listing.
const LIST_FIELDS: &str = "nextPageToken,permissions(id,type,role,emailAddress,domain)";

/// Per-request timeout; the engine itself never times out.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Drive permissions client.
///
/// One client is shared by every worker thread; the agent pools
/// connections and the token provider refreshes behind a lock.
///
/// # Example
///
/// ```no_run
/// use drive::DriveClient;
/// use reconcile::AccessControlClient;
/// use std::path::Path;
///
/// let client = DriveClient::from_credential_file(Path::new("credentials.json")).unwrap();
/// for entry in client.list("1AbCdEf").unwrap() {
///     println!("{entry}");
/// }
/// ```
pub struct DriveClient {
    agent: ureq::Agent,
    auth: TokenProvider,
    api_base: String,
}

impl DriveClient {
    /// Create a client for a service account.
    pub fn new(key: ServiceAccountKey) -> Self {
        Self::with_api_base(key, DEFAULT_API_BASE)
    }

    /// Create a client that talks to a custom API base (for testing).
    pub fn with_api_base(key: ServiceAccountKey, api_base: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            auth: TokenProvider::new(key),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Load the service-account key file and build a client.
    pub fn from_credential_file(path: &Path) -> Result<Self> {
        Ok(Self::new(ServiceAccountKey::from_file(path)?))
    }

    /// Get the current API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Service account the client acts as.
    pub fn client_email(&self) -> &str {
        self.auth.client_email()
    }

    fn permissions_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/permissions", self.api_base, file_id)
    }

    fn permission_url(&self, file_id: &str, permission_id: &str) -> String {
        format!(
            "{}/files/{}/permissions/{}",
            self.api_base, file_id, permission_id
        )
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.token(&self.agent)?))
    }

    /// List every permission on a file, following pagination.
    pub fn list_permissions(&self, file_id: &str) -> Result<Vec<Entry>> {
        let url = self.permissions_url(file_id);
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .agent
                .get(&url)
                .header("Authorization", &self.bearer()?)
                .query("fields", LIST_FIELDS)
                .query("supportsAllDrives", "true");
            if let Some(token) = &page_token {
                request = request.query("pageToken", token);
            }

            let page: PermissionList = check(request.call()?)?.body_mut().read_json()?;
            entries.extend(known_entries(file_id, page.permissions));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("{file_id}: listed {} permissions", entries.len());
        Ok(entries)
    }

    /// Create a permission on a file.
    pub fn create_permission(
        &self,
        file_id: &str,
        principal: &str,
        kind: EntryKind,
        role: Role,
    ) -> Result<Entry> {
        let body = NewPermission::new(principal, kind, role);
        let permission: Permission = check(
            self.agent
                .post(&self.permissions_url(file_id))
                .header("Authorization", &self.bearer()?)
                .query("fields", PERMISSION_FIELDS)
                .query("supportsAllDrives", "true")
                .send_json(&body)?,
        )?
        .body_mut()
        .read_json()?;

        permission.try_into()
    }

    /// Change the role of a permission.
    pub fn update_permission(
        &self,
        file_id: &str,
        permission_id: &str,
        role: Role,
        transfer_ownership: bool,
    ) -> Result<Entry> {
        let permission: Permission = check(
            self.agent
                .patch(&self.permission_url(file_id, permission_id))
                .header("Authorization", &self.bearer()?)
                .query("fields", PERMISSION_FIELDS)
                .query("supportsAllDrives", "true")
                .query("transferOwnership", if transfer_ownership { "true" } else { "false" })
                .send_json(&RoleChange { role: role.as_str() })?,
        )?
        .body_mut()
        .read_json()?;

        permission.try_into()
    }

    /// Delete a permission.
    pub fn delete_permission(&self, file_id: &str, permission_id: &str) -> Result<()> {
        check(
            self.agent
                .delete(&self.permission_url(file_id, permission_id))
                .header("Authorization", &self.bearer()?)
                .query("supportsAllDrives", "true")
                .call()?,
        )?;
        Ok(())
    }
}

impl AccessControlClient for DriveClient {
    fn list(&self, resource_id: &str) -> anyhow::Result<Vec<Entry>> {
        Ok(self.list_permissions(resource_id)?)
    }

    fn create(
        &self,
        resource_id: &str,
        principal: &str,
        kind: EntryKind,
        role: Role,
    ) -> anyhow::Result<Entry> {
        Ok(self.create_permission(resource_id, principal, kind, role)?)
    }

    fn update(
        &self,
        resource_id: &str,
        id: &str,
        role: Role,
        transfer_ownership: bool,
    ) -> anyhow::Result<Entry> {
        Ok(self.update_permission(resource_id, id, role, transfer_ownership)?)
    }

    fn delete(&self, resource_id: &str, id: &str) -> anyhow::Result<()> {
        Ok(self.delete_permission(resource_id, id)?)
    }
}

/// Turn a non-success response into an error carrying Drive's message.
fn check(mut response: Response<Body>) -> Result<Response<Body>> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    let message = response
        .body_mut()
        .read_json::<ApiErrorResponse>()
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {}", status));
    Err(Error::http(message, Some(status)))
}

// =============================================================================
// Drive API wire types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionList {
    #[serde(default)]
    permissions: Vec<Permission>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Permission {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    role: String,
    email_address: Option<String>,
    domain: Option<String>,
}

impl TryFrom<Permission> for Entry {
    type Error = Error;

    fn try_from(p: Permission) -> Result<Self> {
        let kind: EntryKind = p
            .kind
            .parse()
            .map_err(|e| Error::InvalidResponse(format!("permission {}: {}", p.id, e)))?;
        let role: Role = p
            .role
            .parse()
            .map_err(|e| Error::InvalidResponse(format!("permission {}: {}", p.id, e)))?;

        let principal = match kind {
            EntryKind::User | EntryKind::Group => p.email_address.unwrap_or_default(),
            EntryKind::Domain => p.domain.unwrap_or_default(),
            EntryKind::Anyone => String::new(),
        };

        Ok(Entry::observed(p.id, principal, kind, role))
    }
}

/// Convert listed permissions, skipping any with a type or role this client
/// cannot represent. Skipped grants are neither classified nor deleted.
fn known_entries(file_id: &str, permissions: Vec<Permission>) -> Vec<Entry> {
    permissions
        .into_iter()
        .filter_map(|permission| match Entry::try_from(permission) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("{file_id}: skipping {e}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPermission<'a> {
    role: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<&'a str>,
}

impl<'a> NewPermission<'a> {
    fn new(principal: &'a str, kind: EntryKind, role: Role) -> Self {
        let (email_address, domain) = match kind {
            EntryKind::User | EntryKind::Group => (Some(principal), None),
            EntryKind::Domain => (None, Some(principal)),
            EntryKind::Anyone => (None, None),
        };
        Self {
            role: role.as_str(),
            kind: kind.as_str(),
            email_address,
            domain,
        }
    }
}

#[derive(Debug, Serialize)]
struct RoleChange<'a> {
    role: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
