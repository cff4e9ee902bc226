//! View reconciler.
//!
//! Keeps [`ViewState`] consistent with the ledger: every action performs one
//! write through the [`LedgerClient`], then re-reads user, calendars and
//! statistics from scratch. Writes touching the same entity are serialized
//! until the earlier write has been reconciled.

mod span;
mod state;

pub use span::{contains_date, spans_day};
pub use state::{Readiness, ViewState};

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::client::{LedgerClient, WriteReceipt};
use crate::config::SettlePolicy;
use crate::entity::User;
use crate::error::{ChainCalError, ChainCalResult};
use crate::ids::{Address, EventId, ObjectId};
use crate::locks::EntityLocks;

pub struct ViewReconciler {
    client: Arc<LedgerClient>,
    state: RwLock<ViewState>,
    locks: EntityLocks,
}

impl ViewReconciler {
    pub fn new(client: Arc<LedgerClient>) -> Self {
        ViewReconciler {
            client,
            state: RwLock::new(ViewState::default()),
            locks: EntityLocks::default(),
        }
    }

    pub fn client(&self) -> &Arc<LedgerClient> {
        &self.client
    }

    /// A copy of the current view state.
    pub async fn snapshot(&self) -> ViewState {
        self.state.read().await.clone()
    }

    /// Check the wallet and load everything if an account is connected.
    ///
    /// Without an account the view is `NotReady` and all ledger-derived state
    /// is dropped; so is switching to a different account.
    pub async fn connect(&self) -> ChainCalResult<Readiness> {
        let account = self.client.account().await?;

        {
            let mut state = self.state.write().await;
            let switched = state.account.as_ref().map(|a| &a.address)
                != account.as_ref().map(|a| &a.address);

            if switched {
                state.clear_entities();
                self.client.clear_user();
            }

            match account {
                Some(account) => {
                    if switched {
                        info!(address = %account.address, "wallet account connected");
                    }
                    state.readiness = Readiness::Ready;
                    state.account = Some(account);
                }
                None => {
                    if state.is_ready() {
                        info!("wallet disconnected");
                    }
                    state.readiness = Readiness::NotReady;
                    state.account = None;
                    return Ok(Readiness::NotReady);
                }
            }
        }

        self.refresh_all().await?;
        Ok(Readiness::Ready)
    }

    // RECONCILIATION:

    pub async fn refresh_user(&self) -> ChainCalResult<Option<User>> {
        let user = self.client.get_user().await?;
        self.state.write().await.user = user.clone();
        Ok(user)
    }

    /// Re-read the loaded user's calendars; empty without a user.
    pub async fn refresh_calendars(&self) -> ChainCalResult<()> {
        let calendars = if self.client.current_user().is_some() {
            self.client.get_calendars().await?
        } else {
            Vec::new()
        };
        self.state.write().await.calendars = calendars;
        Ok(())
    }

    pub async fn refresh_stats(&self) -> ChainCalResult<()> {
        let stats = self.client.get_stats().await?;
        self.state.write().await.stats = Some(stats);
        Ok(())
    }

    /// Full re-fetch: user first, since calendars are read through it.
    pub async fn refresh_all(&self) -> ChainCalResult<()> {
        self.refresh_user().await?;
        self.refresh_calendars().await?;
        self.refresh_stats().await
    }

    async fn reconcile<F>(&self, receipt: &WriteReceipt, expect: F) -> ChainCalResult<()>
    where
        F: Fn(&ViewState) -> bool,
    {
        match self.client.settle_policy() {
            SettlePolicy::Fixed(_) => {
                self.refresh_all().await?;
                if !expect(&*self.state.read().await) {
                    warn!(
                        entry_point = %receipt.entry_point,
                        digest = %receipt.digest,
                        "ledger does not reflect the write yet"
                    );
                }
                Ok(())
            }
            SettlePolicy::Poll { interval, timeout } => {
                let deadline = Instant::now() + timeout;
                let mut attempts = 0u32;

                loop {
                    attempts += 1;
                    self.refresh_all().await?;
                    if expect(&*self.state.read().await) {
                        debug!(entry_point = %receipt.entry_point, attempts, "write reconciled");
                        return Ok(());
                    }
                    if Instant::now() >= deadline {
                        warn!(
                            entry_point = %receipt.entry_point,
                            digest = %receipt.digest,
                            attempts,
                            "gave up waiting for the ledger"
                        );
                        return Err(ChainCalError::SettleTimeout(timeout.as_millis()));
                    }
                    sleep(interval).await;
                }
            }
        }
    }

    /// Run `write` with exclusive access to `keys`, then reconcile until
    /// `expect` holds. `baseline` is read once the locks are held and handed
    /// to `expect`; locks and the loading flag are held through
    /// reconciliation.
    async fn mutate<W, B, F>(
        &self,
        keys: &[&str],
        write: W,
        baseline: B,
        expect: F,
    ) -> ChainCalResult<WriteReceipt>
    where
        W: Future<Output = ChainCalResult<WriteReceipt>>,
        B: Fn(&ViewState) -> usize,
        F: Fn(&ViewState, usize) -> bool,
    {
        let _entities = self.locks.lock_all(keys).await;
        let before = baseline(&*self.state.read().await);

        let _loading = self.client.loading().begin();
        let receipt = write.await?;
        self.reconcile(&receipt, |s| expect(s, before)).await?;
        Ok(receipt)
    }

    /// Lock key of the connected account's User object.
    async fn user_key(&self) -> String {
        let state = self.state.read().await;
        match &state.account {
            Some(account) => format!("user:{}", account.address),
            None => "user:".to_string(),
        }
    }

    fn object_key(id: &ObjectId) -> String {
        format!("object:{id}")
    }

    // ACTIONS:

    pub async fn create_user(&self, name: &str) -> ChainCalResult<WriteReceipt> {
        let user = self.user_key().await;
        self.mutate(
            &[&user],
            self.client.create_user(name),
            |_| 0,
            |s, _| s.user.is_some(),
        )
        .await
    }

    pub async fn create_calendar(&self, name: &str) -> ChainCalResult<WriteReceipt> {
        let user = self.user_key().await;
        self.mutate(
            &[&user],
            self.client.create_calendar(name),
            |s| s.calendars_titled(name).count(),
            |s, before| s.calendars_titled(name).count() > before,
        )
        .await
    }

    pub async fn create_calendar_event(
        &self,
        calendar_id: &ObjectId,
        title: &str,
        start: &str,
        end: &str,
    ) -> ChainCalResult<WriteReceipt> {
        let titled = |s: &ViewState| {
            s.calendar(calendar_id)
                .map_or(0, |c| c.events.iter().filter(|e| e.title == title).count())
        };
        let calendar = Self::object_key(calendar_id);

        self.mutate(
            &[&calendar],
            self.client.create_calendar_event(calendar_id, title, start, end),
            titled,
            |s, before| titled(s) > before,
        )
        .await
    }

    pub async fn delete_calendar_event(
        &self,
        calendar_id: &ObjectId,
        event_id: &EventId,
    ) -> ChainCalResult<WriteReceipt> {
        let calendar = Self::object_key(calendar_id);
        self.mutate(
            &[&calendar],
            self.client.delete_calendar_event(calendar_id, event_id),
            |_| 0,
            |s, _| {
                s.calendar(calendar_id)
                    .is_none_or(|c| c.event(event_id).is_none())
            },
        )
        .await
    }

    /// Writes both the calendar and the user's calendar list.
    pub async fn delete_calendar(&self, calendar_id: &ObjectId) -> ChainCalResult<WriteReceipt> {
        let user = self.user_key().await;
        let calendar = Self::object_key(calendar_id);
        self.mutate(
            &[&user, &calendar],
            self.client.delete_calendar(calendar_id),
            |_| 0,
            |s, _| {
                s.calendar(calendar_id).is_none()
                    && s.user.as_ref().is_none_or(|u| !u.has_calendar(calendar_id))
            },
        )
        .await
    }

    pub async fn share_calendar(
        &self,
        calendar_id: &ObjectId,
        address: &Address,
    ) -> ChainCalResult<WriteReceipt> {
        let calendar = Self::object_key(calendar_id);
        self.mutate(
            &[&calendar],
            self.client.share_calendar(calendar_id, address),
            |_| 0,
            |s, _| {
                s.stats
                    .as_ref()
                    .is_some_and(|st| st.has_pending_share(calendar_id, address))
                    || s.calendar(calendar_id)
                        .is_some_and(|c| c.is_shared_with(address))
            },
        )
        .await
    }

    /// Writes both the calendar and the user's calendar list.
    pub async fn accept_share(&self, calendar_id: &ObjectId) -> ChainCalResult<WriteReceipt> {
        let user = self.user_key().await;
        let calendar = Self::object_key(calendar_id);
        self.mutate(
            &[&user, &calendar],
            self.client.accept_share(calendar_id),
            |_| 0,
            |s, _| s.user.as_ref().is_some_and(|u| u.has_calendar(calendar_id)),
        )
        .await
    }

    /// Diagnostic call; nothing to reconcile.
    pub async fn debug_print_message(&self, message: &str) -> ChainCalResult<WriteReceipt> {
        self.client.debug_print_message(message).await
    }

    // LOCAL VIEW PREFERENCES:

    /// Hide a calendar's events from the merged view.
    pub async fn hide_calendar(&self, calendar_id: &ObjectId) {
        self.state.write().await.disabled.insert(calendar_id.clone());
    }

    /// Hide or show a calendar's events. Returns whether it is now hidden.
    pub async fn toggle_calendar(&self, calendar_id: &ObjectId) -> bool {
        let mut state = self.state.write().await;
        if state.disabled.remove(calendar_id) {
            false
        } else {
            state.disabled.insert(calendar_id.clone());
            true
        }
    }
}
