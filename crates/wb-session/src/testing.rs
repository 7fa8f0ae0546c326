//! Scriptable gateway and recording reporter for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use wb_provider::{ProviderEvent, ProviderGateway, ProviderSubscription, WalletError, WalletResult};
use wb_types::{
    Network, NetworkDescriptor, Receipt, StatusEvent, StatusKind, U256, ValidatedTransfer,
    WalletAddress,
};

use crate::{SessionConfig, StatusReporter, WalletBridge};

pub(crate) const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub(crate) const BOB: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub(crate) const TOKEN: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

pub(crate) fn addr(raw: &str) -> WalletAddress {
    WalletAddress::parse(raw).unwrap()
}

type Pending<T> = oneshot::Receiver<WalletResult<T>>;

pub(crate) struct Script {
    pub available: bool,
    pub request_accounts: WalletResult<Vec<WalletAddress>>,
    pub pending_requests: VecDeque<Pending<Vec<WalletAddress>>>,
    pub current_accounts: WalletResult<Vec<WalletAddress>>,
    pub chain_id: u64,
    pub network_error: Option<WalletError>,
    pub balance: WalletResult<U256>,
    pub pending_balances: VecDeque<Pending<U256>>,
    pub send_result: WalletResult<String>,
    pub pending_sends: VecDeque<Pending<String>>,
    pub receipt: WalletResult<Receipt>,
    pub pending_receipts: VecDeque<Pending<Receipt>>,
    pub switch_result: WalletResult<()>,
    pub add_result: WalletResult<()>,
    pub token_symbol: WalletResult<String>,
    pub token_decimals: WalletResult<u8>,
    pub token_balance: WalletResult<U256>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            available: true,
            request_accounts: Ok(vec![addr(ALICE)]),
            pending_requests: VecDeque::new(),
            current_accounts: Ok(Vec::new()),
            chain_id: 1,
            network_error: None,
            balance: Ok(U256::from(1_000_000_000_000_000_000_u128)),
            pending_balances: VecDeque::new(),
            send_result: Ok("0xfeed".to_owned()),
            pending_sends: VecDeque::new(),
            receipt: Ok(Receipt {
                block_number: 42,
                status: 1,
            }),
            pending_receipts: VecDeque::new(),
            switch_result: Ok(()),
            add_result: Ok(()),
            token_symbol: Ok("USDC".to_owned()),
            token_decimals: Ok(6),
            token_balance: Ok(U256::from(2_500_000_u64)),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    pub script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
    events: Mutex<Option<mpsc::UnboundedSender<ProviderEvent>>>,
}

impl FakeGateway {
    pub fn with(configure: impl FnOnce(&mut Script)) -> Arc<Self> {
        let gateway = Self::default();
        configure(&mut *gateway.script.lock().unwrap());
        Arc::new(gateway)
    }

    pub fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == name).count()
    }

    /// Pushes an event into the live subscription, if any.
    pub fn emit(&self, event: ProviderEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            tx.send(event).unwrap();
        }
    }

    pub fn defer_request_accounts(&self) -> oneshot::Sender<WalletResult<Vec<WalletAddress>>> {
        let (tx, rx) = oneshot::channel();
        self.script().pending_requests.push_back(rx);
        tx
    }

    /// Next read of `balance` waits until the returned sender fires.
    pub fn defer_balance(&self) -> oneshot::Sender<WalletResult<U256>> {
        let (tx, rx) = oneshot::channel();
        self.script().pending_balances.push_back(rx);
        tx
    }

    pub fn defer_send(&self) -> oneshot::Sender<WalletResult<String>> {
        let (tx, rx) = oneshot::channel();
        self.script().pending_sends.push_back(rx);
        tx
    }

    pub fn defer_receipt(&self) -> oneshot::Sender<WalletResult<Receipt>> {
        let (tx, rx) = oneshot::channel();
        self.script().pending_receipts.push_back(rx);
        tx
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_owned());
    }
}

async fn settle<T>(pending: Pending<T>) -> WalletResult<T> {
    pending
        .await
        .unwrap_or_else(|_| Err(WalletError::Cancelled("test dropped sender".to_owned())))
}

#[async_trait]
impl ProviderGateway for FakeGateway {
    fn is_available(&self) -> bool {
        self.script().available
    }

    async fn request_accounts(&self) -> WalletResult<Vec<WalletAddress>> {
        self.record("request_accounts");
        if !self.script().available {
            return Err(WalletError::NoProvider);
        }
        let pending = self.script().pending_requests.pop_front();
        match pending {
            Some(pending) => settle(pending).await,
            None => self.script().request_accounts.clone(),
        }
    }

    async fn current_accounts(&self) -> WalletResult<Vec<WalletAddress>> {
        self.record("current_accounts");
        self.script().current_accounts.clone()
    }

    async fn network(&self) -> WalletResult<Network> {
        self.record("network");
        let script = self.script();
        match &script.network_error {
            Some(err) => Err(err.clone()),
            None => Ok(Network::from_chain_id(script.chain_id)),
        }
    }

    async fn balance(&self, _account: &WalletAddress) -> WalletResult<U256> {
        self.record("balance");
        let pending = self.script().pending_balances.pop_front();
        match pending {
            Some(pending) => settle(pending).await,
            None => self.script().balance.clone(),
        }
    }

    async fn send_transaction(
        &self,
        _from: &WalletAddress,
        _transfer: &ValidatedTransfer,
    ) -> WalletResult<String> {
        self.record("send_transaction");
        let pending = self.script().pending_sends.pop_front();
        match pending {
            Some(pending) => settle(pending).await,
            None => self.script().send_result.clone(),
        }
    }

    async fn wait_for_receipt(&self, _hash: &str) -> WalletResult<Receipt> {
        self.record("wait_for_receipt");
        let pending = self.script().pending_receipts.pop_front();
        match pending {
            Some(pending) => settle(pending).await,
            None => self.script().receipt.clone(),
        }
    }

    async fn switch_network(&self, _chain_id: u64) -> WalletResult<()> {
        self.record("switch_network");
        self.script().switch_result.clone()
    }

    async fn add_network(&self, _descriptor: &NetworkDescriptor) -> WalletResult<()> {
        self.record("add_network");
        self.script().add_result.clone()
    }

    async fn token_symbol(&self, _token: &WalletAddress) -> WalletResult<String> {
        self.record("token_symbol");
        self.script().token_symbol.clone()
    }

    async fn token_decimals(&self, _token: &WalletAddress) -> WalletResult<u8> {
        self.record("token_decimals");
        self.script().token_decimals.clone()
    }

    async fn token_balance(&self, _token: &WalletAddress, _holder: &WalletAddress) -> WalletResult<U256> {
        self.record("token_balance");
        self.script().token_balance.clone()
    }

    fn subscribe(&self) -> ProviderSubscription {
        let (tx, subscription) = ProviderSubscription::channel();
        *self.events.lock().unwrap() = Some(tx);
        subscription
    }
}

#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<StatusEvent>>,
}

impl RecordingReporter {
    pub fn kinds(&self) -> Vec<StatusKind> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.kind.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, event: StatusEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub reporter: Arc<RecordingReporter>,
    pub bridge: WalletBridge,
}

pub(crate) fn harness(configure: impl FnOnce(&mut Script)) -> Harness {
    harness_with_config(configure, SessionConfig::default())
}

pub(crate) fn harness_with_config(configure: impl FnOnce(&mut Script), config: SessionConfig) -> Harness {
    let gateway = FakeGateway::with(configure);
    let reporter = Arc::new(RecordingReporter::default());
    let bridge = WalletBridge::new(gateway.clone(), reporter.clone(), config);
    Harness {
        gateway,
        reporter,
        bridge,
    }
}

/// Yields until `ready` holds, so spawned tasks can reach their next await.
pub(crate) async fn until(mut ready: impl FnMut() -> bool) {
    while !ready() {
        tokio::task::yield_now().await;
    }
}
