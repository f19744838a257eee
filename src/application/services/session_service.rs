//! Session manager - Login, elapsed-time tracking and listener lifecycle

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::errors::{SessionError, StorageError};
use crate::application::messaging::EventRouter;
use crate::domain::entities::{AccountScope, AccountSession, SessionCredential};
use crate::domain::traits::{ChatClient, ClientConnector, ClientOptions, EventStream, HistoryStore};

const TICK: Duration = Duration::from_secs(1);

/// Arguments of a login request
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub credential: SessionCredential,
    pub enabled_commands: Vec<String>,
    pub prefix: String,
    pub admins: Vec<String>,
}

/// Result of a successful `login` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(AccountSession),
    /// The account already had a live session; nothing was re-authenticated
    AlreadyActive(AccountSession),
}

impl LoginOutcome {
    pub fn session(&self) -> &AccountSession {
        match self {
            LoginOutcome::LoggedIn(s) | LoginOutcome::AlreadyActive(s) => s,
        }
    }
}

struct LiveSession {
    snapshot: AccountSession,
    cancel: CancellationToken,
    ticker: JoinHandle<()>,
}

type LiveSet = Arc<RwLock<HashMap<String, LiveSession>>>;

/// Owns every live account session.
///
/// Each session has a per-second ticker and an event listener, both bound to
/// the session's cancellation token. Removing a session from the live set
/// cancels the token under the same lock, so neither task outlives it.
pub struct SessionManager {
    connector: Arc<dyn ClientConnector>,
    router: Arc<EventRouter>,
    history: Arc<dyn HistoryStore>,
    options: ClientOptions,
    live: LiveSet,
}

impl SessionManager {
    pub fn new(
        connector: Arc<dyn ClientConnector>,
        router: Arc<EventRouter>,
        history: Arc<dyn HistoryStore>,
        options: ClientOptions,
    ) -> Self {
        Self {
            connector,
            router,
            history,
            options,
            live: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Authenticate an account and start its ticker and listener.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, SessionError> {
        let credential_id = request
            .credential
            .account_id()
            .ok_or(SessionError::InvalidCredential)?
            .to_string();

        if let Some(existing) = self.session(&credential_id).await {
            info!(account = %credential_id, "User is already logged in");
            return Ok(LoginOutcome::AlreadyActive(existing));
        }

        let client = self
            .connector
            .login(&request.credential)
            .await
            .map_err(SessionError::Auth)?;
        let account_id = client.current_user_id().await.map_err(SessionError::Auth)?;

        let profile = client
            .user_info(&account_id)
            .await
            .map_err(SessionError::Auth)?
            .unwrap_or_default();
        let (Some(name), Some(profile_url), Some(thumb_src)) =
            (profile.name, profile.profile_url, profile.thumb_src)
        else {
            warn!(account = %account_id, "Profile unavailable, account may be suspended");
            return Err(SessionError::ProfileUnavailable);
        };

        self.history
            .upsert_account(
                &account_id,
                &request.prefix,
                &request.admins,
                &request.enabled_commands,
            )
            .await?;
        let elapsed_seconds = self
            .history
            .find(&account_id)
            .await?
            .map(|record| record.time)
            .unwrap_or(0);

        client.set_options(&self.options);
        let stream = client.listen().await.map_err(SessionError::Auth)?;

        let snapshot = AccountSession {
            account_id: account_id.clone(),
            display_name: name,
            profile_url,
            thumb_src,
            elapsed_seconds,
        };
        let scope = AccountScope::new(account_id.clone(), request.prefix)
            .with_enabled_commands(request.enabled_commands)
            .with_admins(request.admins);

        let mut live = self.live.write().await;
        if let Some(existing) = live.get(&account_id) {
            info!(account = %account_id, "Concurrent login lost the race, keeping existing session");
            return Ok(LoginOutcome::AlreadyActive(existing.snapshot.clone()));
        }

        let cancel = CancellationToken::new();
        let ticker = tokio::spawn(run_ticker(self.live.clone(), account_id.clone(), cancel.clone()));
        tokio::spawn(run_listener(
            self.router.clone(),
            client,
            scope,
            stream,
            cancel.clone(),
        ));
        live.insert(
            account_id.clone(),
            LiveSession {
                snapshot: snapshot.clone(),
                cancel,
                ticker,
            },
        );

        info!(account = %account_id, name = %snapshot.display_name, "Logged in");
        Ok(LoginOutcome::LoggedIn(snapshot))
    }

    /// Tear a session down. Returns its final snapshot, or `None` if the
    /// account was not logged in.
    pub async fn logout(&self, account_id: &str) -> Option<AccountSession> {
        let removed = {
            let mut live = self.live.write().await;
            let removed = live.remove(account_id)?;
            removed.cancel.cancel();
            removed
        };

        if let Err(e) = removed.ticker.await {
            warn!(account = %account_id, error = %e, "Ticker task ended abnormally");
        }

        let snapshot = removed.snapshot;
        if let Err(e) = self
            .history
            .record_times(&[(snapshot.account_id.clone(), snapshot.elapsed_seconds)])
            .await
        {
            error!(account = %account_id, error = %e, "Failed to persist elapsed time");
        }
        info!(account = %account_id, elapsed = snapshot.elapsed_seconds, "Logged out");
        Some(snapshot)
    }

    /// Log out every live session
    pub async fn shutdown(&self) {
        let ids: Vec<String> = self.live.read().await.keys().cloned().collect();
        for id in ids {
            self.logout(&id).await;
        }
    }

    pub async fn session(&self, account_id: &str) -> Option<AccountSession> {
        self.live
            .read()
            .await
            .get(account_id)
            .map(|s| s.snapshot.clone())
    }

    /// Admin listing of live accounts
    pub async fn active_accounts(&self) -> Vec<AccountSession> {
        let mut accounts: Vec<AccountSession> = self
            .live
            .read()
            .await
            .values()
            .map(|s| s.snapshot.clone())
            .collect();
        accounts.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        accounts
    }

    /// Write every live session's elapsed time to the history store
    pub async fn persist_history(&self) -> Result<(), StorageError> {
        let times: Vec<(String, u64)> = self
            .live
            .read()
            .await
            .values()
            .map(|s| (s.snapshot.account_id.clone(), s.snapshot.elapsed_seconds))
            .collect();
        if times.is_empty() {
            return Ok(());
        }
        debug!(accounts = times.len(), "Persisting elapsed time");
        self.history.record_times(&times).await
    }
}

async fn run_ticker(live: LiveSet, account_id: String, cancel: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let mut live = live.write().await;
                match live.get_mut(&account_id) {
                    Some(session) if !session.cancel.is_cancelled() => {
                        session.snapshot.elapsed_seconds += 1;
                    }
                    _ => break,
                }
            }
        }
    }
    debug!(account = %account_id, "Ticker stopped");
}

async fn run_listener(
    router: Arc<EventRouter>,
    client: Arc<dyn ChatClient>,
    scope: AccountScope,
    mut stream: EventStream,
    cancel: CancellationToken,
) {
    loop {
        let item = tokio::select! {
            _ = cancel.cancelled() => break,
            item = stream.recv() => item,
        };
        match item {
            Some(Ok(event)) => {
                let outcome = router.dispatch(&event, client.as_ref(), &scope).await;
                debug!(account = %scope.account_id, ?outcome, "Event dispatched");
            }
            Some(Err(e)) => {
                error!(account = %scope.account_id, error = %e, "Error during API listen");
            }
            None => {
                warn!(account = %scope.account_id, "Event stream closed");
                break;
            }
        }
    }
    debug!(account = %scope.account_id, "Listener stopped");
}
