//! In-memory ledger for tests.
//!
//! Implements both the read endpoints and the wallet, and executes the
//! calendar module's entry points against JSON object contents shaped like
//! the node returns them (u64 as strings, nested structs wrapped in
//! `{ type, fields }`). Reads can be made to lag behind writes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::LedgerClient;
use crate::config::{ChainCalConfig, Network, SettlePolicy};
use crate::error::{ChainCalError, ChainCalResult};
use crate::ids::{Address, ObjectId, ObjectTypes};
use crate::loading::LoadingFlag;
use crate::rpc::protocol::Method;
use crate::rpc::{LedgerRpc, MoveContent, ObjectData};
use crate::transaction::{CallArg, EntryPoint, MoveCall, Pure, Transaction};
use crate::wallet::{ExecutionResult, Wallet, WalletAccount};

pub const PACKAGE_ID: &str = "0x0cafe";
pub const STATISTICS_ID: &str = "0x5747";

pub fn test_config() -> ChainCalConfig {
    ChainCalConfig::new(
        ObjectId::from(PACKAGE_ID),
        ObjectId::from(STATISTICS_ID),
        Network::Local,
    )
}

pub fn poll_config() -> ChainCalConfig {
    let mut config = test_config();
    config.settle = SettlePolicy::Poll {
        interval: Duration::from_millis(100),
        timeout: Duration::from_secs(2),
    };
    config
}

pub fn test_client() -> (Arc<MemoryLedger>, LedgerClient) {
    client_with(&test_config())
}

pub fn client_with(config: &ChainCalConfig) -> (Arc<MemoryLedger>, LedgerClient) {
    let ledger = Arc::new(MemoryLedger::new(config));
    let client = LedgerClient::new(config, ledger.clone(), ledger.clone());
    (ledger, client)
}

#[derive(Clone)]
struct StoredObject {
    owner: Option<Address>,
    type_tag: String,
    fields: Value,
}

impl StoredObject {
    fn to_data(&self, id: &ObjectId) -> ObjectData {
        ObjectData {
            object_id: id.clone(),
            type_tag: Some(self.type_tag.clone()),
            content: Some(MoveContent {
                data_type: "moveObject".into(),
                type_tag: self.type_tag.clone(),
                fields: self.fields.clone(),
            }),
        }
    }
}

type Objects = BTreeMap<ObjectId, StoredObject>;

#[derive(Default)]
struct State {
    committed: Objects,
    /// What reads return while `lag` is non-zero.
    visible: Objects,
    lag: usize,
    read_lag: usize,
    account: Option<WalletAccount>,
    executed: Vec<Transaction>,
    messages: Vec<String>,
    reads: usize,
    reject: Option<String>,
    fail_read: Option<(i64, String)>,
    /// Watched flag and what it showed at each read and write.
    loading: Option<LoadingFlag>,
    loading_seen: Vec<bool>,
    next_id: u64,
}

impl State {
    fn observe_loading(&mut self) {
        if let Some(flag) = &self.loading {
            let loading = flag.is_loading();
            self.loading_seen.push(loading);
        }
    }

    fn read(&mut self, method: Method) -> ChainCalResult<Objects> {
        self.reads += 1;
        self.observe_loading();

        if let Some((code, message)) = self.fail_read.take() {
            return Err(ChainCalError::Rpc {
                method: method.name().to_string(),
                code,
                message,
            });
        }

        if self.lag > 0 {
            self.lag -= 1;
        } else {
            self.visible = self.committed.clone();
        }
        Ok(self.visible.clone())
    }

    fn fresh_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId::new(format!("0x{:04x}", self.next_id))
    }

    fn fields_mut(&mut self, id: &ObjectId) -> Result<&mut Value, String> {
        self.committed
            .get_mut(id)
            .map(|o| &mut o.fields)
            .ok_or_else(|| format!("object {id} does not exist"))
    }

    fn bump(&mut self, stats: &ObjectId, counter: &str, delta: i64) -> Result<(), String> {
        let fields = self.fields_mut(stats)?;
        let current: i64 = fields[counter]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        fields[counter] = json!((current + delta).max(0).to_string());
        Ok(())
    }
}

pub struct MemoryLedger {
    types: ObjectTypes,
    event_type: String,
    share_type: String,
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new(config: &ChainCalConfig) -> Self {
        let types = ObjectTypes::for_package(&config.package_id);
        let base = types.user.trim_end_matches("::User").to_string();

        let mut state = State::default();
        let stats = StoredObject {
            owner: None,
            type_tag: format!("{base}::Statistics"),
            fields: json!({
                "id": { "id": config.statistics_object_id },
                "user_count": "0",
                "calendar_count": "0",
                "event_count": "0",
                "users": [],
                "pending_calendar_shares": []
            }),
        };
        state
            .committed
            .insert(config.statistics_object_id.clone(), stats);
        state.visible = state.committed.clone();

        MemoryLedger {
            event_type: format!("{base}::CalendarEvent"),
            share_type: format!("{base}::PendingShare"),
            types,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn connect(&self, address: &str) {
        self.state().account = Some(WalletAccount {
            address: Address::from(address),
            public_key: format!("pk-{address}"),
        });
    }

    pub fn disconnect(&self) {
        self.state().account = None;
    }

    /// Reads after each write see the previous state this many times.
    pub fn set_read_lag(&self, reads: usize) {
        self.state().read_lag = reads;
    }

    pub fn reject_next(&self, message: &str) {
        self.state().reject = Some(message.to_string());
    }

    /// The next read fails with a JSON-RPC error object.
    pub fn fail_next_read(&self, code: i64, message: &str) {
        self.state().fail_read = Some((code, message.to_string()));
    }

    /// Record `flag` at every read and write from now on.
    pub fn watch_loading(&self, flag: &LoadingFlag) {
        self.state().loading = Some(flag.clone());
    }

    pub fn loading_seen(&self) -> Vec<bool> {
        self.state().loading_seen.clone()
    }

    pub fn insert_owned(&self, owner: &str, type_tag: &str, fields: Value) {
        let mut state = self.state();
        let id = fields["id"]["id"]
            .as_str()
            .map(ObjectId::from)
            .unwrap_or_else(|| state.fresh_id());
        let object = StoredObject {
            owner: Some(Address::from(owner)),
            type_tag: type_tag.to_string(),
            fields,
        };
        state.committed.insert(id.clone(), object.clone());
        state.visible.insert(id, object);
    }

    pub fn executed(&self) -> Vec<Transaction> {
        self.state().executed.clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.state().messages.clone()
    }

    pub fn reads(&self) -> usize {
        self.state().reads
    }

    fn apply(&self, state: &mut State, sender: &Address, call: &MoveCall) -> Result<(), String> {
        let args = Args(&call.arguments);

        match call.entry_point {
            EntryPoint::CreateUser => {
                let stats = args.object(0)?;
                let id = state.fresh_id();
                state.committed.insert(
                    id.clone(),
                    StoredObject {
                        owner: Some(sender.clone()),
                        type_tag: self.types.user.clone(),
                        fields: json!({ "id": { "id": id }, "name": args.string(1)?, "calendars": [] }),
                    },
                );
                state.bump(&stats, "user_count", 1)?;
                push(state.fields_mut(&stats)?, "users", json!(sender));
            }
            EntryPoint::CreateCalendar => {
                let (stats, user) = (args.object(0)?, args.object(1)?);
                let id = state.fresh_id();
                state.committed.insert(
                    id.clone(),
                    StoredObject {
                        owner: Some(sender.clone()),
                        type_tag: self.types.calendar.clone(),
                        fields: json!({
                            "id": { "id": id },
                            "title": args.string(2)?,
                            "events": [],
                            "shared_with": []
                        }),
                    },
                );
                push(state.fields_mut(&user)?, "calendars", json!(id));
                state.bump(&stats, "calendar_count", 1)?;
            }
            EntryPoint::CreateCalendarEvent => {
                let (stats, calendar) = (args.object(0)?, args.object(1)?);
                let id = state.fresh_id();
                let event = json!({
                    "type": self.event_type,
                    "fields": {
                        "id": id,
                        "title": args.string(2)?,
                        "start_timestamp": args.u64(3)?.to_string(),
                        "end_timestamp": args.u64(4)?.to_string()
                    }
                });
                push(state.fields_mut(&calendar)?, "events", event);
                state.bump(&stats, "event_count", 1)?;
            }
            EntryPoint::DeleteCalendarEvent => {
                let (stats, calendar, event) = (args.object(0)?, args.object(1)?, args.id(2)?);
                let removed = remove_where(state.fields_mut(&calendar)?, "events", |e| {
                    e["fields"]["id"] == json!(event)
                });
                if removed == 0 {
                    return Err(format!("event {event} not in calendar {calendar}"));
                }
                state.bump(&stats, "event_count", -1)?;
            }
            EntryPoint::DeleteCalendar => {
                let (stats, user, calendar) = (args.object(0)?, args.object(1)?, args.object(2)?);
                let removed = state
                    .committed
                    .remove(&calendar)
                    .ok_or_else(|| format!("calendar {calendar} does not exist"))?;
                let events = removed.fields["events"].as_array().map_or(0, Vec::len);
                remove_where(state.fields_mut(&user)?, "calendars", |c| c == &json!(calendar));
                state.bump(&stats, "calendar_count", -1)?;
                state.bump(&stats, "event_count", -(events as i64))?;
            }
            EntryPoint::ShareCalendar => {
                let (stats, calendar, address) = (args.object(0)?, args.object(1)?, args.address(2)?);
                state.fields_mut(&calendar)?;
                let share = json!({
                    "type": self.share_type,
                    "fields": { "calendar_address": calendar, "user_address": address }
                });
                push(state.fields_mut(&stats)?, "pending_calendar_shares", share);
            }
            EntryPoint::AcceptShare => {
                let (stats, user, calendar) = (args.object(0)?, args.object(1)?, args.object(2)?);
                let removed = remove_where(state.fields_mut(&stats)?, "pending_calendar_shares", |s| {
                    s["fields"]["calendar_address"] == json!(calendar)
                        && s["fields"]["user_address"] == json!(sender)
                });
                if removed == 0 {
                    return Err(format!("no pending share of {calendar} for {sender}"));
                }
                push(state.fields_mut(&user)?, "calendars", json!(calendar));
                push(state.fields_mut(&calendar)?, "shared_with", json!(sender));
            }
            EntryPoint::DebugPrintMessage => {
                let message = args.string(0)?;
                state.messages.push(message);
            }
        }

        Ok(())
    }
}

struct Args<'a>(&'a [CallArg]);

impl Args<'_> {
    fn get(&self, i: usize) -> Result<&CallArg, String> {
        self.0.get(i).ok_or_else(|| format!("missing argument {i}"))
    }

    fn object(&self, i: usize) -> Result<ObjectId, String> {
        self.get(i)?
            .as_object()
            .cloned()
            .ok_or_else(|| format!("argument {i} is not an object"))
    }

    fn pure(&self, i: usize) -> Result<&Pure, String> {
        match self.get(i)? {
            CallArg::Pure(p) => Ok(p),
            CallArg::Object(_) => Err(format!("argument {i} is not pure")),
        }
    }

    fn string(&self, i: usize) -> Result<String, String> {
        match self.pure(i)? {
            Pure::String(s) => Ok(s.clone()),
            other => Err(format!("argument {i} is not a string: {other:?}")),
        }
    }

    fn u64(&self, i: usize) -> Result<u64, String> {
        match self.pure(i)? {
            Pure::U64(n) => Ok(*n),
            other => Err(format!("argument {i} is not a u64: {other:?}")),
        }
    }

    fn address(&self, i: usize) -> Result<Address, String> {
        match self.pure(i)? {
            Pure::Address(a) => Ok(a.clone()),
            other => Err(format!("argument {i} is not an address: {other:?}")),
        }
    }

    fn id(&self, i: usize) -> Result<String, String> {
        match self.pure(i)? {
            Pure::Id(id) => Ok(id.clone()),
            other => Err(format!("argument {i} is not an id: {other:?}")),
        }
    }
}

fn push(fields: &mut Value, list: &str, item: Value) {
    if let Some(items) = fields[list].as_array_mut() {
        items.push(item);
    } else {
        fields[list] = json!([item]);
    }
}

fn remove_where(fields: &mut Value, list: &str, pred: impl Fn(&Value) -> bool) -> usize {
    let Some(items) = fields[list].as_array_mut() else {
        return 0;
    };
    let before = items.len();
    items.retain(|item| !pred(item));
    before - items.len()
}

#[async_trait]
impl LedgerRpc for MemoryLedger {
    async fn owned_objects(
        &self,
        owner: &Address,
        struct_type: Option<&str>,
    ) -> ChainCalResult<Vec<ObjectData>> {
        let objects = self.state().read(Method::GetOwnedObjects)?;
        Ok(objects
            .iter()
            .filter(|(_, o)| o.owner.as_ref() == Some(owner))
            .filter(|(_, o)| struct_type.is_none_or(|t| o.type_tag == t))
            .map(|(id, o)| o.to_data(id))
            .collect())
    }

    async fn object(&self, id: &ObjectId) -> ChainCalResult<Option<ObjectData>> {
        let objects = self.state().read(Method::GetObject)?;
        Ok(objects.get(id).map(|o| o.to_data(id)))
    }

    async fn multi_objects(&self, ids: &[ObjectId]) -> ChainCalResult<Vec<ObjectData>> {
        let objects = self.state().read(Method::MultiGetObjects)?;
        Ok(ids
            .iter()
            .filter_map(|id| objects.get(id).map(|o| o.to_data(id)))
            .collect())
    }
}

#[async_trait]
impl Wallet for MemoryLedger {
    async fn account(&self) -> ChainCalResult<Option<WalletAccount>> {
        Ok(self.state().account.clone())
    }

    async fn sign_and_execute(
        &self,
        transaction: &Transaction,
    ) -> ChainCalResult<ExecutionResult> {
        let mut state = self.state();
        state.observe_loading();

        if let Some(message) = state.reject.take() {
            return Err(ChainCalError::Wallet(message));
        }

        if state.lag == 0 {
            state.visible = state.committed.clone();
        }
        state.lag = state.read_lag;

        self.apply(&mut state, &transaction.sender, &transaction.call)
            .map_err(|e| {
                ChainCalError::Wallet(format!("MoveAbort in {}: {e}", transaction.call.target()))
            })?;

        state.executed.push(transaction.clone());
        Ok(ExecutionResult {
            digest: format!("D{}", state.executed.len()),
        })
    }
}
