//! In-memory access-control store for testing without network access
//!
//! ```
//! use reconcile::{AccessControlClient, EntryKind, MemoryClient, Role};
//!
//! let client = MemoryClient::new();
//! client.create("doc", "bob@x.com", EntryKind::User, Role::Reader).unwrap();
//!
//! let entries = client.list("doc").unwrap();
//! assert_eq!(entries.len(), 1);
//! assert!(entries[0].id.is_some());
//! ```

use crate::context::AccessControlClient;
use crate::entry::{Entry, EntryKind, Role};
use anyhow::{Result, anyhow, bail};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A remote call as seen by [`MemoryClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        resource_id: String,
    },
    Create {
        resource_id: String,
        principal: String,
        kind: EntryKind,
        role: Role,
    },
    Update {
        resource_id: String,
        id: String,
        role: Role,
        transfer_ownership: bool,
    },
    Delete {
        resource_id: String,
        id: String,
    },
}

/// Thread-safe in-memory store of entries per resource
///
/// Principals registered with [`MemoryClient::fail_for`] make every mutating
/// call touching them fail, which lets tests exercise partial failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    resources: Arc<Mutex<HashMap<String, Vec<Entry>>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    next_id: Arc<AtomicUsize>,
}

impl MemoryClient {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource with observed entries
    pub fn insert(&self, resource_id: impl Into<String>, entries: Vec<Entry>) {
        lock(&self.resources).insert(resource_id.into(), entries);
    }

    /// Make mutations involving `principal` fail
    pub fn fail_for(&self, principal: impl Into<String>) {
        lock(&self.failing).insert(principal.into());
    }

    /// Snapshot of the entries stored for a resource
    pub fn entries(&self, resource_id: &str) -> Vec<Entry> {
        lock(&self.resources)
            .get(resource_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every call made so far, in arrival order
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Number of calls that changed or tried to change state
    pub fn mutation_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| !matches!(c, Call::List { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    fn check_failure(&self, principal: &str) -> Result<()> {
        if lock(&self.failing).contains(principal) {
            bail!("injected failure for {principal}");
        }
        Ok(())
    }
}

impl AccessControlClient for MemoryClient {
    fn list(&self, resource_id: &str) -> Result<Vec<Entry>> {
        self.record(Call::List {
            resource_id: resource_id.to_string(),
        });
        lock(&self.resources)
            .get(resource_id)
            .cloned()
            .ok_or_else(|| anyhow!("File not found: {resource_id}"))
    }

    fn create(
        &self,
        resource_id: &str,
        principal: &str,
        kind: EntryKind,
        role: Role,
    ) -> Result<Entry> {
        self.record(Call::Create {
            resource_id: resource_id.to_string(),
            principal: principal.to_string(),
            kind,
            role,
        });
        self.check_failure(principal)?;

        let id = format!("m{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let entry = Entry::observed(id, principal, kind, role);
        lock(&self.resources)
            .entry(resource_id.to_string())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    fn update(
        &self,
        resource_id: &str,
        id: &str,
        role: Role,
        transfer_ownership: bool,
    ) -> Result<Entry> {
        self.record(Call::Update {
            resource_id: resource_id.to_string(),
            id: id.to_string(),
            role,
            transfer_ownership,
        });

        let mut resources = lock(&self.resources);
        let entry = resources
            .get_mut(resource_id)
            .and_then(|entries| entries.iter_mut().find(|e| e.id.as_deref() == Some(id)))
            .ok_or_else(|| anyhow!("Permission not found: {id}"))?;

        self.check_failure(&entry.principal)?;
        if role.transfers_ownership() && !transfer_ownership {
            bail!("transferOwnership must be set to grant owner");
        }

        entry.role = role;
        Ok(entry.clone())
    }

    fn delete(&self, resource_id: &str, id: &str) -> Result<()> {
        self.record(Call::Delete {
            resource_id: resource_id.to_string(),
            id: id.to_string(),
        });

        let mut resources = lock(&self.resources);
        let entries = resources
            .get_mut(resource_id)
            .ok_or_else(|| anyhow!("File not found: {resource_id}"))?;
        let index = entries
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
            .ok_or_else(|| anyhow!("Permission not found: {id}"))?;

        self.check_failure(&entries[index].principal)?;
        entries.remove(index);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
