//! Ledger client: domain operations as ledger transactions, ledger reads as
//! typed entities.
//!
//! Writes build one move call, hand it to the wallet to sign and execute, and
//! then settle according to the configured [`SettlePolicy`] before returning a
//! [`WriteReceipt`]. Reconciling view state afterwards is the caller's job
//! (see [`crate::reconciler::ViewReconciler`]).

use std::sync::{Arc, PoisonError, RwLock};

use chrono_tz::Tz;
use tracing::{debug, info};

use crate::config::{ChainCalConfig, SettlePolicy};
use crate::entity::{Calendar, Statistics, User};
use crate::error::{ChainCalError, ChainCalResult};
use crate::ids::{Address, EventId, ObjectId, ObjectTypes};
use crate::loading::LoadingFlag;
use crate::rpc::LedgerRpc;
use crate::timestamp::parse_millis;
use crate::transaction::{CallArg, EntryPoint, MoveCall, Transaction};
use crate::wallet::{Wallet, WalletAccount};

/// Completion signal of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub entry_point: EntryPoint,
    pub digest: String,
}

pub struct LedgerClient {
    package_id: ObjectId,
    statistics_object_id: ObjectId,
    types: ObjectTypes,
    settle: SettlePolicy,
    timezone: Tz,
    rpc: Arc<dyn LedgerRpc>,
    wallet: Arc<dyn Wallet>,
    /// User last returned by `get_user`; writes that reference the user read it.
    user: RwLock<Option<User>>,
    loading: LoadingFlag,
}

impl LedgerClient {
    pub fn new(config: &ChainCalConfig, rpc: Arc<dyn LedgerRpc>, wallet: Arc<dyn Wallet>) -> Self {
        LedgerClient {
            types: ObjectTypes::for_package(&config.package_id),
            package_id: config.package_id.clone(),
            statistics_object_id: config.statistics_object_id.clone(),
            settle: config.settle,
            timezone: config.timezone,
            rpc,
            wallet,
            user: RwLock::new(None),
            loading: LoadingFlag::default(),
        }
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn settle_policy(&self) -> SettlePolicy {
        self.settle
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub async fn account(&self) -> ChainCalResult<Option<WalletAccount>> {
        self.wallet.account().await
    }

    pub fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the loaded user, e.g. after the wallet disconnected.
    pub fn clear_user(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    async fn sender(&self) -> ChainCalResult<Address> {
        self.wallet
            .account()
            .await?
            .map(|account| account.address)
            .ok_or(ChainCalError::NoWalletAccount)
    }

    fn require_user(&self) -> ChainCalResult<User> {
        self.current_user().ok_or(ChainCalError::UserNotLoaded)
    }

    fn statistics(&self) -> CallArg {
        CallArg::object(&self.statistics_object_id)
    }

    fn call(&self, entry_point: EntryPoint, arguments: Vec<CallArg>) -> MoveCall {
        MoveCall::new(&self.package_id, entry_point, arguments)
    }

    async fn execute(&self, call: MoveCall) -> ChainCalResult<WriteReceipt> {
        let sender = self.sender().await?;
        let entry_point = call.entry_point;
        let settles = entry_point.settles();
        let transaction = Transaction::new(sender, call);

        let _loading = settles.then(|| self.loading.begin());

        info!(call = %transaction.call.target(), "submitting transaction");
        let result = self.wallet.sign_and_execute(&transaction).await?;
        debug!(%entry_point, digest = %result.digest, "transaction executed");

        if settles {
            self.settle().await;
        }

        Ok(WriteReceipt {
            entry_point,
            digest: result.digest,
        })
    }

    async fn settle(&self) {
        if let SettlePolicy::Fixed(delay) = self.settle {
            debug!(?delay, "waiting for ledger to settle");
            tokio::time::sleep(delay).await;
        }
    }

    // WRITES:

    /// Fails if a user was already loaded for this account.
    pub async fn create_user(&self, name: &str) -> ChainCalResult<WriteReceipt> {
        if let Some(user) = self.current_user() {
            return Err(ChainCalError::UserExists(user.name));
        }
        let call = self.call(
            EntryPoint::CreateUser,
            vec![self.statistics(), CallArg::string(name)],
        );
        self.execute(call).await
    }

    pub async fn create_calendar(&self, name: &str) -> ChainCalResult<WriteReceipt> {
        let user = self.require_user()?;
        let call = self.call(
            EntryPoint::CreateCalendar,
            vec![self.statistics(), CallArg::object(&user.id), CallArg::string(name)],
        );
        self.execute(call).await
    }

    /// `start` and `end` are ISO-like date strings; they are converted to
    /// epoch milliseconds but not checked against each other.
    pub async fn create_calendar_event(
        &self,
        calendar_id: &ObjectId,
        title: &str,
        start: &str,
        end: &str,
    ) -> ChainCalResult<WriteReceipt> {
        let start = parse_millis(start, self.timezone)?;
        let end = parse_millis(end, self.timezone)?;

        let call = self.call(
            EntryPoint::CreateCalendarEvent,
            vec![
                self.statistics(),
                CallArg::object(calendar_id),
                CallArg::string(title),
                CallArg::u64(start),
                CallArg::u64(end),
            ],
        );
        self.execute(call).await
    }

    pub async fn delete_calendar_event(
        &self,
        calendar_id: &ObjectId,
        event_id: &EventId,
    ) -> ChainCalResult<WriteReceipt> {
        let call = self.call(
            EntryPoint::DeleteCalendarEvent,
            vec![
                self.statistics(),
                CallArg::object(calendar_id),
                CallArg::event_id(event_id),
            ],
        );
        self.execute(call).await
    }

    pub async fn delete_calendar(&self, calendar_id: &ObjectId) -> ChainCalResult<WriteReceipt> {
        let user = self.require_user()?;
        let call = self.call(
            EntryPoint::DeleteCalendar,
            vec![
                self.statistics(),
                CallArg::object(&user.id),
                CallArg::object(calendar_id),
            ],
        );
        self.execute(call).await
    }

    /// Offer a calendar to another address. Adds a pending share; ownership
    /// does not change.
    pub async fn share_calendar(
        &self,
        calendar_id: &ObjectId,
        address: &Address,
    ) -> ChainCalResult<WriteReceipt> {
        let call = self.call(
            EntryPoint::ShareCalendar,
            vec![
                self.statistics(),
                CallArg::object(calendar_id),
                CallArg::address(address),
            ],
        );
        self.execute(call).await
    }

    pub async fn accept_share(&self, calendar_id: &ObjectId) -> ChainCalResult<WriteReceipt> {
        let user = self.require_user()?;
        let call = self.call(
            EntryPoint::AcceptShare,
            vec![
                self.statistics(),
                CallArg::object(&user.id),
                CallArg::object(calendar_id),
            ],
        );
        self.execute(call).await
    }

    /// Diagnostic call. Does not settle and does not touch the loading flag.
    pub async fn debug_print_message(&self, message: &str) -> ChainCalResult<WriteReceipt> {
        let call = self.call(EntryPoint::DebugPrintMessage, vec![CallArg::string(message)]);
        self.execute(call).await
    }

    // READS:

    /// The first User object owned by the connected account, if any.
    pub async fn get_user(&self) -> ChainCalResult<Option<User>> {
        let owner = self.sender().await?;
        let objects = self
            .rpc
            .owned_objects(&owner, Some(&self.types.user))
            .await?;

        let user = objects
            .iter()
            .find(|o| o.content_type() == Some(self.types.user.as_str()))
            .map(User::from_object)
            .transpose()?;

        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user.clone();
        Ok(user)
    }

    /// The loaded user's calendars, batch-fetched by id.
    pub async fn get_calendars(&self) -> ChainCalResult<Vec<Calendar>> {
        let user = self.require_user()?;
        if user.calendars.is_empty() {
            return Ok(Vec::new());
        }

        self.rpc
            .multi_objects(&user.calendars)
            .await?
            .iter()
            .map(Calendar::from_object)
            .collect()
    }

    /// Calendar objects owned directly by the connected account.
    pub async fn get_owned_calendars(&self) -> ChainCalResult<Vec<Calendar>> {
        let owner = self.sender().await?;

        self.rpc
            .owned_objects(&owner, Some(&self.types.calendar))
            .await?
            .iter()
            .filter(|o| o.content_type() == Some(self.types.calendar.as_str()))
            .map(Calendar::from_object)
            .collect()
    }

    pub async fn get_stats(&self) -> ChainCalResult<Statistics> {
        let object = self
            .rpc
            .object(&self.statistics_object_id)
            .await?
            .ok_or_else(|| {
                ChainCalError::Config(format!(
                    "Statistics object {} not found on the ledger",
                    self.statistics_object_id
                ))
            })?;

        Statistics::from_object(&object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryLedger, test_client, test_config};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_get_user_none_without_user_object() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");

        assert_eq!(client.get_user().await.unwrap(), None);
        assert_eq!(client.current_user(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_user_then_get_user() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");

        let receipt = client.create_user("Alice").await.unwrap();
        assert_eq!(receipt.entry_point, EntryPoint::CreateUser);

        let user = client.get_user().await.unwrap().unwrap();
        assert_eq!(user.name, "Alice");
        assert!(user.calendars.is_empty());
        assert_eq!(client.current_user(), Some(user));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_user_ignores_other_types() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");
        ledger.insert_owned("0xa11ce", "0xdead::calendar::User", serde_json::json!({
            "id": { "id": "0xforeign" }, "name": "Mallory", "calendars": []
        }));

        assert_eq!(client.get_user().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_user_returns_first_of_several() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");
        ledger.insert_owned("0xa11ce", "0xcafe::calendar::User", serde_json::json!({
            "id": { "id": "0x0b" }, "name": "Second", "calendars": []
        }));
        ledger.insert_owned("0xa11ce", "0xcafe::calendar::User", serde_json::json!({
            "id": { "id": "0x0a" }, "name": "First", "calendars": []
        }));

        let user = client.get_user().await.unwrap().unwrap();
        assert_eq!(user.name, "First");
        assert_eq!(user.id, ObjectId::from("0x0a"));
        assert_eq!(client.current_user(), Some(user));
    }

    #[tokio::test(start_paused = true)]
    async fn test_precondition_errors_skip_wallet_and_ledger() {
        let (ledger, client) = test_client();

        let err = client.create_user("Alice").await.unwrap_err();
        assert!(matches!(err, ChainCalError::NoWalletAccount));

        ledger.connect("0xa11ce");
        for err in [
            client.create_calendar("Team").await.unwrap_err(),
            client.delete_calendar(&ObjectId::from("0xc")).await.unwrap_err(),
            client.accept_share(&ObjectId::from("0xc")).await.unwrap_err(),
            client.get_calendars().await.unwrap_err(),
        ] {
            assert!(matches!(err, ChainCalError::UserNotLoaded));
            assert!(err.is_precondition());
        }

        assert!(ledger.executed().is_empty());
        assert_eq!(ledger.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_user_refused_once_user_loaded() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");
        client.create_user("Alice").await.unwrap();
        client.get_user().await.unwrap();

        let err = client.create_user("Alice again").await.unwrap_err();
        assert!(matches!(err, ChainCalError::UserExists(name) if name == "Alice"));
        assert_eq!(ledger.executed().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_settle_for_configured_delay() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");

        let started = tokio::time::Instant::now();
        client.create_user("Alice").await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        client.debug_print_message("hello").await.unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(ledger.messages(), vec!["hello".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_covers_call_and_settle() {
        let (ledger, client) = test_client();
        let client = Arc::new(client);
        ledger.connect("0xa11ce");

        let mut rx = client.loading().subscribe();
        let write = {
            let client = client.clone();
            tokio::spawn(async move { client.create_user("Alice").await })
        };

        assert!(rx.changed().await);
        assert!(rx.is_loading());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(client.loading().is_loading());

        write.await.unwrap().unwrap();
        assert!(!client.loading().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debug_message_leaves_loading_untouched() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");

        let rx = client.loading().subscribe();
        client.debug_print_message("ping").await.unwrap();
        assert!(!rx.is_loading());
        assert!(!client.loading().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_rejection_propagates_and_clears_loading() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");
        ledger.reject_next("User rejected the request");

        let err = client.create_user("Alice").await.unwrap_err();
        assert!(matches!(err, ChainCalError::Wallet(msg) if msg == "User rejected the request"));
        assert!(!client.loading().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_dates_submitted_as_millis() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");
        client.create_user("Alice").await.unwrap();
        client.get_user().await.unwrap();
        client.create_calendar("Team").await.unwrap();
        let calendar = client.get_calendars().await.unwrap().remove(0);

        client
            .create_calendar_event(
                &calendar.id,
                "Standup",
                "2024-01-01T09:00:00Z",
                "2024-01-01T09:30:00Z",
            )
            .await
            .unwrap();

        let call = ledger.executed().pop().unwrap().call;
        assert_eq!(call.target(), "0x0cafe::calendar::create_calendar_event");
        assert_eq!(call.arguments[3], CallArg::u64(1_704_099_600_000));
        assert_eq!(call.arguments[4], CallArg::u64(1_704_101_400_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_event_date_is_rejected_locally() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");

        let err = client
            .create_calendar_event(&ObjectId::from("0xc"), "x", "tomorrow", "later")
            .await
            .unwrap_err();
        assert!(matches!(err, ChainCalError::InvalidDate(_)));
        assert!(ledger.executed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_statistics_object() {
        let ledger = Arc::new(MemoryLedger::new(&test_config()));
        let mut config = test_config();
        config.statistics_object_id = ObjectId::from("0xmissing");
        let client = LedgerClient::new(&config, ledger.clone(), ledger);

        assert!(matches!(client.get_stats().await, Err(ChainCalError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_owned_calendars_read_by_type() {
        let (ledger, client) = test_client();
        ledger.connect("0xa11ce");
        ledger.insert_owned("0xa11ce", "0xcafe::calendar::Calendar", serde_json::json!({
            "id": { "id": "0xc0" }, "title": "Legacy", "events": []
        }));

        let calendars = client.get_owned_calendars().await.unwrap();
        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0].title, "Legacy");
    }
}
