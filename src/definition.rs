//! Permission file loading
//!
//! The YAML document is parsed into wire structs and converted straight into
//! a validated [`DesiredState`]; nothing downstream sees the raw document.
//!
//! ```yaml
//! version: 1
//! permissions:
//!   - fileId: 1AbCdEf
//!     resource:
//!       - emailAddress: bob@example.com
//!         type: user
//!         role: writer
//!       - domain: example.com
//!         type: domain
//!         role: reader
//! ```

use anyhow::{Context, Result};
use reconcile::{DesiredState, DesiredStateSource, Entry, EntryKind, ResourceSpec, Role};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Definition {
    pub version: u32,
    #[serde(default)]
    pub permissions: Vec<FilePermissions>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilePermissions {
    pub file_id: String,
    #[serde(default)]
    pub resource: Vec<PermissionDef>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionDef {
    /// Email for user/group grants, domain name for domain grants
    #[serde(default, alias = "principal", alias = "domain")]
    pub email_address: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub role: Role,
}

impl Definition {
    /// Parse YAML text
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid permission file format")
    }

    /// Validate and convert into the engine's desired state
    pub fn into_desired_state(self) -> Result<DesiredState> {
        let resources = self
            .permissions
            .into_iter()
            .map(|file| {
                let entries = file
                    .resource
                    .into_iter()
                    .map(|p| Entry::desired(p.email_address.unwrap_or_default(), p.kind, p.role))
                    .collect();
                ResourceSpec::new(file.file_id, entries)
            })
            .collect::<reconcile::error::Result<Vec<_>>>()?;

        Ok(DesiredState::new(self.version, resources)?)
    }
}

/// Desired state read from a YAML permission file
pub struct PermissionFile {
    path: PathBuf,
    debug: bool,
}

impl PermissionFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            debug: false,
        }
    }

    /// Dump the parsed document to stderr before validating it
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DesiredStateSource for PermissionFile {
    fn load(&self) -> Result<DesiredState> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Could not read {}", self.path.display()))?;
        let definition = Definition::parse(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        if self.debug {
            eprintln!("{definition:#?}");
        }

        let state = definition
            .into_desired_state()
            .with_context(|| format!("Invalid permission file {}", self.path.display()))?;
        log::info!(
            "Loaded {} files, {} permissions from {}",
            state.resources().len(),
            state.entry_count(),
            self.path.display()
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::ConfigError;
    use std::io::Write;

    const SAMPLE: &str = r"
version: 1
permissions:
  - fileId: f1
    resource:
      - emailAddress: bob@x.com
        type: user
        role: writer
      - domain: x.com
        type: domain
        role: reader
      - type: anyone
        role: reader
  - fileId: f2
    resource:
      - principal: eng@x.com
        type: group
        role: commenter
";

    fn config_error(err: &anyhow::Error) -> Option<&ConfigError> {
        err.chain().find_map(|e| e.downcast_ref::<ConfigError>())
    }

    #[test]
    fn test_parse_sample() {
        let state = Definition::parse(SAMPLE).unwrap().into_desired_state().unwrap();

        assert_eq!(state.version(), 1);
        assert_eq!(state.resources().len(), 2);
        assert_eq!(state.entry_count(), 4);

        let f1 = &state.resources()[0];
        assert_eq!(f1.resource_id(), "f1");
        assert_eq!(
            f1.desired(),
            &[
                Entry::desired("bob@x.com", EntryKind::User, Role::Writer),
                Entry::desired("x.com", EntryKind::Domain, Role::Reader),
                Entry::desired("", EntryKind::Anyone, Role::Reader),
            ]
        );
        assert_eq!(
            state.resources()[1].desired(),
            &[Entry::desired("eng@x.com", EntryKind::Group, Role::Commenter)]
        );
    }

    #[test]
    fn test_unsupported_version() {
        let err = Definition::parse("version: 2\npermissions: []\n")
            .unwrap()
            .into_desired_state()
            .unwrap_err();
        assert_eq!(config_error(&err), Some(&ConfigError::UnsupportedVersion(2)));
        assert_eq!(err.to_string(), "v2 is not supported");
    }

    #[test]
    fn test_empty_permissions() {
        let err = Definition::parse("version: 1\n")
            .unwrap()
            .into_desired_state()
            .unwrap_err();
        assert_eq!(config_error(&err), Some(&ConfigError::NoResources));
    }

    #[test]
    fn test_empty_resource_list() {
        let err = Definition::parse("version: 1\npermissions:\n  - fileId: f1\n")
            .unwrap()
            .into_desired_state()
            .unwrap_err();
        assert!(matches!(
            config_error(&err),
            Some(ConfigError::NoEntries { resource_id }) if resource_id == "f1"
        ));
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let yaml = r"
version: 1
permissions:
  - fileId: f1
    resource:
      - emailAddress: bob@x.com
        type: user
        role: reader
      - emailAddress: bob@x.com
        type: user
        role: writer
";
        let err = Definition::parse(yaml)
            .unwrap()
            .into_desired_state()
            .unwrap_err();
        assert!(matches!(
            config_error(&err),
            Some(ConfigError::DuplicateDesired { .. })
        ));
    }

    #[test]
    fn test_missing_email_rejected() {
        let yaml = "version: 1\npermissions:\n  - fileId: f1\n    resource:\n      - type: user\n        role: reader\n";
        let err = Definition::parse(yaml)
            .unwrap()
            .into_desired_state()
            .unwrap_err();
        assert!(matches!(
            config_error(&err),
            Some(ConfigError::MissingPrincipal { .. })
        ));
    }

    #[test]
    fn test_unknown_fields_and_roles_rejected() {
        assert!(Definition::parse("version: 1\nextra: true\n").is_err());

        let bad_role = "version: 1\npermissions:\n  - fileId: f1\n    resource:\n      - emailAddress: a@x.com\n        type: user\n        role: superuser\n";
        assert!(Definition::parse(bad_role).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = PermissionFile::new(file.path());
        assert_eq!(source.path(), file.path());

        let state = source.load().unwrap();
        assert_eq!(state.resources().len(), 2);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let source = PermissionFile::new(Path::new("/nonexistent/permissions.yml"));
        let err = source.load().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/permissions.yml"));
    }

    #[test]
    fn test_load_invalid_file_keeps_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"version: 3\npermissions: []\n").unwrap();

        let err = PermissionFile::new(file.path()).load().unwrap_err();
        assert!(err.to_string().starts_with("Invalid permission file"));
        assert_eq!(config_error(&err), Some(&ConfigError::UnsupportedVersion(3)));
    }
}
