//! Role-tier permission checks

use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::errors::StorageError;
use crate::domain::entities::{AccountScope, Role};
use crate::domain::traits::{ChatClient, HistoryStore, ThreadAdminStore};

/// Pure allow/deny decision for a role tier.
///
/// Tier 3 grants access to callers *on* the account's blacklist. That is the
/// established behaviour of the list and is kept as is.
pub fn role_permits(
    role: Role,
    caller_id: &str,
    global_admins: &[String],
    thread_admins: &[String],
    blacklist: &[String],
) -> bool {
    let is_admin = global_admins.iter().any(|id| id == caller_id);
    match role {
        Role::Everyone => true,
        Role::Admin => is_admin,
        Role::ThreadAdmin => is_admin || thread_admins.iter().any(|id| id == caller_id),
        Role::Blacklisted => blacklist.iter().any(|id| id == caller_id),
    }
}

/// Evaluates role tiers against the master admin list, the account's own
/// admins, the persisted thread admins and the account's blacklist.
pub struct PermissionEvaluator {
    master_admins: Vec<String>,
    history: Arc<dyn HistoryStore>,
    threads: Arc<dyn ThreadAdminStore>,
}

impl PermissionEvaluator {
    pub fn new(
        master_admins: Vec<String>,
        history: Arc<dyn HistoryStore>,
        threads: Arc<dyn ThreadAdminStore>,
    ) -> Self {
        Self {
            master_admins,
            history,
            threads,
        }
    }

    /// Decide whether `caller_id` may run a command of `role`.
    ///
    /// `thread_admins` are the admins of the thread the command came from.
    /// The blacklist is only read for tier 3.
    pub async fn allowed(
        &self,
        role: Role,
        caller_id: &str,
        scope: &AccountScope,
        thread_admins: &[String],
    ) -> Result<bool, StorageError> {
        let global_admins: Vec<String> = self
            .master_admins
            .iter()
            .chain(scope.admins.iter())
            .cloned()
            .collect();

        let blacklist = match role {
            Role::Blacklisted => self
                .history
                .find(&scope.account_id)
                .await?
                .map(|record| record.blacklist)
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        Ok(role_permits(role, caller_id, &global_admins, thread_admins, &blacklist))
    }

    /// Admin ids of a thread, materializing the record on first sight.
    pub async fn thread_admins(
        &self,
        thread_id: &str,
        client: &dyn ChatClient,
    ) -> Result<Vec<String>, StorageError> {
        if let Some(admins) = self.threads.admins(thread_id).await? {
            return Ok(admins);
        }

        match client.thread_admin_ids(thread_id).await {
            Ok(admins) => {
                debug!(thread = %thread_id, count = admins.len(), "Recording thread admins");
                self.threads.insert(thread_id, &admins).await?;
                Ok(admins)
            }
            Err(e) => {
                warn!(thread = %thread_id, error = %e, "Failed to fetch thread admins");
                Ok(Vec::new())
            }
        }
    }
}
