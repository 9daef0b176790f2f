use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};
use yieldfarm_core::classifier::ErrorClassifier;
use yieldfarm_core::error::{LedgerError, Result, StakeError};
use yieldfarm_core::ledger::{
    Account, CommandKind, Confirmation, LedgerReader, RemoteLedgerClient, WalletProvider,
};
use yieldfarm_core::session::{PendingCommand, SessionEvent, SessionSnapshot};

use crate::clock::{Clock, SystemClock};
use crate::pool_cache::{PoolStateCache, RefreshOutcome};

enum Connection {
    Disconnected,
    Connected(RemoteLedgerClient),
}

impl Connection {
    fn account(&self) -> Option<&Account> {
        match self {
            Connection::Disconnected => None,
            Connection::Connected(client) => Some(client.account()),
        }
    }
}

struct ControllerState {
    connection: Connection,
    pending: Option<PendingCommand>,
}

/// Drives one end-user session against the staking pool.
///
/// `SessionController` is responsible for:
/// - Connecting an identity through the wallet provider
/// - Running deposit/withdraw with at most one command in flight
/// - Refreshing the pool cache after every state-changing transition
/// - Turning every remote failure into a classified [`StakeError`]
///
/// State machine: `{Disconnected, Connected(account)} x {Idle, CommandPending}`,
/// starting at `Disconnected x Idle`.
pub struct SessionController {
    wallet: Arc<dyn WalletProvider>,
    reader: Arc<dyn LedgerReader>,
    decimals: u32,
    cache: PoolStateCache,
    state: RwLock<ControllerState>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl SessionController {
    /// Creates a disconnected, idle controller.
    ///
    /// # Arguments
    ///
    /// * `wallet` - Identity and signing capability
    /// * `reader` - Read access to the pool contract
    /// * `decimals` - The ledger's fixed exponent for amount conversion
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        reader: Arc<dyn LedgerReader>,
        decimals: u32,
    ) -> Self {
        Self {
            wallet,
            reader,
            decimals,
            cache: PoolStateCache::new(Arc::new(SystemClock)),
            state: RwLock::new(ControllerState {
                connection: Connection::Disconnected,
                pending: None,
            }),
            events: None,
        }
    }

    /// Replaces the wall clock used to evaluate unlock status.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = PoolStateCache::new(clock);
        self
    }

    /// Publishes [`SessionEvent`]s to `sender`.
    pub fn with_event_sink(mut self, sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    // ============================================================================
    // Connection lifecycle
    // ============================================================================

    /// Requests the active account from the wallet and binds the session to it.
    ///
    /// Re-connecting to the same account is harmless. Switching to another
    /// account drops the previous account's cached position first. A refresh
    /// follows; its failure is reported as an event and does not undo the
    /// connection.
    ///
    /// # Errors
    ///
    /// - `NoProvider` / `ConnectionDenied` from the wallet
    /// - `CommandInProgress` when switching accounts while a command is pending
    pub async fn connect(&self) -> Result<Account> {
        let account = match self.wallet.request_account().await {
            Ok(account) => account,
            Err(err) => {
                warn!(error = %err, "Wallet connection failed");
                let error = StakeError::from(err);
                self.emit(SessionEvent::ConnectionFailed {
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        let switched = {
            let mut state = self.state.write().await;
            match state.connection.account().cloned() {
                Some(current) if current == account => false,
                Some(_) if state.pending.is_some() => {
                    warn!(%account, "Refusing to switch accounts while a command is pending");
                    return Err(StakeError::CommandInProgress);
                }
                _ => {
                    state.connection = Connection::Connected(RemoteLedgerClient::new(
                        account.clone(),
                        self.decimals,
                        self.wallet.clone(),
                        self.reader.clone(),
                    ));
                    true
                }
            }
        };

        if switched {
            self.cache.clear_position().await;
            info!(%account, "Wallet connected");
            self.emit(SessionEvent::Connected {
                account: account.clone(),
            });
        }

        // Failure is already published as RefreshFailed.
        let _ = self.refresh().await;
        Ok(account)
    }

    pub async fn connected_account(&self) -> Option<Account> {
        self.state.read().await.connection.account().cloned()
    }

    // ============================================================================
    // Commands
    // ============================================================================

    /// Deposits a human-entered decimal amount for the connected account.
    ///
    /// # Errors
    ///
    /// `NotConnected`, `CommandInProgress`, `InvalidAmount`, or the classified
    /// remote failure. Cached state is unchanged on every error.
    pub async fn submit_deposit(&self, amount: &str) -> Result<Confirmation> {
        let client = self.begin_command(CommandKind::Deposit).await?;
        let outcome = client.deposit(amount).await;
        self.finish_command(CommandKind::Deposit, outcome).await
    }

    /// Withdraws the connected account's deposit.
    pub async fn submit_withdraw(&self) -> Result<Confirmation> {
        let client = self.begin_command(CommandKind::Withdraw).await?;
        let outcome = client.withdraw().await;
        self.finish_command(CommandKind::Withdraw, outcome).await
    }

    pub async fn is_command_pending(&self) -> bool {
        self.state.read().await.pending.is_some()
    }

    /// Moves `Connected x Idle` to `Connected x CommandPending`.
    async fn begin_command(&self, command: CommandKind) -> Result<RemoteLedgerClient> {
        let mut state = self.state.write().await;
        let client = match &state.connection {
            Connection::Connected(client) => client.clone(),
            Connection::Disconnected => return Err(StakeError::NotConnected),
        };
        if let Some(pending) = &state.pending {
            warn!(%command, in_flight = %pending.kind, "Rejecting command while another is pending");
            return Err(StakeError::CommandInProgress);
        }

        state.pending = Some(PendingCommand::new(command));
        drop(state);

        self.emit(SessionEvent::CommandSubmitted { command });
        Ok(client)
    }

    /// Returns to `Idle`; on success invalidates and refreshes the cache.
    async fn finish_command(
        &self,
        command: CommandKind,
        outcome: std::result::Result<Confirmation, LedgerError>,
    ) -> Result<Confirmation> {
        self.state.write().await.pending = None;

        match outcome {
            Ok(confirmation) => {
                info!(%command, tx_hash = %confirmation.tx_hash, "Command confirmed");
                self.emit(SessionEvent::CommandConfirmed {
                    command,
                    tx_hash: confirmation.tx_hash.clone(),
                });
                // Any refresh still in flight started before this confirmation.
                self.cache.invalidate().await;
                let _ = self.refresh().await;
                Ok(confirmation)
            }
            Err(err) => {
                let error = ErrorClassifier::classify_ledger(&err);
                warn!(%command, kind = error.kind(), cause = %err, "Command failed");
                self.emit(SessionEvent::CommandFailed {
                    command,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    // ============================================================================
    // Read side
    // ============================================================================

    /// Re-reads pool state, plus the position of the connected account if any.
    ///
    /// On failure the last-known-good snapshot stays in place and a
    /// `RefreshFailed` event is published.
    pub async fn refresh(&self) -> Result<()> {
        let account = self.connected_account().await;
        match self.cache.refresh(self.reader.as_ref(), account.as_ref()).await {
            Ok(RefreshOutcome::Applied) => {
                self.emit(SessionEvent::Refreshed);
                Ok(())
            }
            Ok(RefreshOutcome::Superseded) => Ok(()),
            Err(err) => {
                let error = ErrorClassifier::classify_ledger(&err);
                warn!(kind = error.kind(), cause = %err, "Refresh failed, keeping last snapshot");
                self.emit(SessionEvent::RefreshFailed {
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Everything the presentation layer observes, evaluated now.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let (connected_account, pending_command) = {
            let state = self.state.read().await;
            (state.connection.account().cloned(), state.pending.clone())
        };
        let view = self.cache.current().await;

        // A position is only meaningful while an account is connected.
        let (user_position, unlock_status) = if connected_account.is_some() {
            (view.user_position, view.unlock_status)
        } else {
            (None, None)
        };

        SessionSnapshot {
            connected_account,
            pool_state: view.pool_state,
            user_position,
            unlock_status,
            pending_command,
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver just means nobody is listening.
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use yieldfarm_core::amount::Amount;
    use yieldfarm_core::error::RawFailure;
    use yieldfarm_core::ledger::{ContractCall, Receipt, SubmissionHandle, WalletError};
    use yieldfarm_core::pool::{PoolState, UnlockStatus, UserPosition};

    const ALICE: &str = "0x00000000000000000000000000000000000000aa";
    const BOB: &str = "0x00000000000000000000000000000000000000bb";

    // Mock wallet: scripted account answer, optional gate on confirmation
    struct MockWallet {
        account: Mutex<std::result::Result<Account, WalletError>>,
        submitted: Mutex<Vec<ContractCall>>,
        submit_failure: Mutex<Option<RawFailure>>,
        gate: Option<Arc<Notify>>,
    }

    impl MockWallet {
        fn new(account: &str) -> Self {
            Self {
                account: Mutex::new(Ok(Account::new(account))),
                submitted: Mutex::new(Vec::new()),
                submit_failure: Mutex::new(None),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl WalletProvider for MockWallet {
        async fn request_account(&self) -> std::result::Result<Account, WalletError> {
            self.account.lock().unwrap().clone()
        }

        async fn sign_and_submit(
            &self,
            _from: &Account,
            call: &ContractCall,
        ) -> std::result::Result<SubmissionHandle, RawFailure> {
            self.submitted.lock().unwrap().push(*call);
            if let Some(failure) = self.submit_failure.lock().unwrap().clone() {
                return Err(failure);
            }
            Ok(SubmissionHandle {
                tx_hash: "0xabc".into(),
            })
        }

        async fn await_confirmation(
            &self,
            handle: &SubmissionHandle,
        ) -> std::result::Result<Receipt, RawFailure> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(Receipt {
                tx_hash: handle.tx_hash.clone(),
                block_number: Some(1),
                succeeded: true,
                revert_reason: None,
            })
        }
    }

    struct MockReader {
        pool: Mutex<std::result::Result<PoolState, RawFailure>>,
        position: Mutex<UserPosition>,
    }

    impl MockReader {
        fn new() -> Self {
            Self {
                pool: Mutex::new(Ok(PoolState {
                    total_deposited: Amount::from_base_units(100),
                    rate_basis_points: 500,
                    lock_duration_seconds: 86_400,
                })),
                position: Mutex::new(UserPosition::default()),
            }
        }
    }

    #[async_trait]
    impl LedgerReader for MockReader {
        async fn pool_state(&self) -> std::result::Result<PoolState, RawFailure> {
            self.pool.lock().unwrap().clone()
        }

        async fn user_position(
            &self,
            _account: &Account,
        ) -> std::result::Result<UserPosition, RawFailure> {
            Ok(*self.position.lock().unwrap())
        }
    }

    fn controller(wallet: Arc<MockWallet>, reader: Arc<MockReader>) -> SessionController {
        SessionController::new(wallet, reader, 18).with_clock(Arc::new(FixedClock::new(1_000)))
    }

    #[tokio::test]
    async fn test_initial_state_is_disconnected_idle() {
        let controller = controller(Arc::new(MockWallet::new(ALICE)), Arc::new(MockReader::new()));

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.connected_account, None);
        assert!(!snapshot.is_command_pending());
        assert_eq!(snapshot.pool_state, PoolState::default());
    }

    #[tokio::test]
    async fn test_connect_binds_account_and_refreshes() {
        let reader = Arc::new(MockReader::new());
        *reader.position.lock().unwrap() = UserPosition {
            deposited_amount: Amount::from_base_units(5),
            deposit_timestamp: 1_000,
        };
        let controller = controller(Arc::new(MockWallet::new(ALICE)), reader);

        let account = controller.connect().await.unwrap();

        assert_eq!(account, Account::new(ALICE));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.connected_account, Some(Account::new(ALICE)));
        assert_eq!(snapshot.pool_state.lock_duration_seconds, 86_400);
        assert_eq!(snapshot.unlock_status, Some(UnlockStatus::LockedUntil(87_400)));
    }

    #[tokio::test]
    async fn test_connect_failures_stay_disconnected() {
        let wallet = Arc::new(MockWallet::new(ALICE));
        *wallet.account.lock().unwrap() = Err(WalletError::NoProvider("missing".into()));
        let controller = controller(wallet.clone(), Arc::new(MockReader::new()));

        assert_eq!(controller.connect().await, Err(StakeError::NoProvider));

        *wallet.account.lock().unwrap() = Err(WalletError::Denied(RawFailure::new("4001", "no")));
        assert_eq!(controller.connect().await, Err(StakeError::ConnectionDenied));
        assert_eq!(controller.connected_account().await, None);
    }

    #[tokio::test]
    async fn test_reconnect_same_account_is_harmless() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let controller = controller(Arc::new(MockWallet::new(ALICE)), Arc::new(MockReader::new()))
            .with_event_sink(sender);

        controller.connect().await.unwrap();
        controller.connect().await.unwrap();

        let mut connected = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, SessionEvent::Connected { .. }) {
                connected += 1;
            }
        }
        assert_eq!(connected, 1);
        assert_eq!(controller.connected_account().await, Some(Account::new(ALICE)));
    }

    #[tokio::test]
    async fn test_switching_account_replaces_position() {
        let wallet = Arc::new(MockWallet::new(ALICE));
        let reader = Arc::new(MockReader::new());
        *reader.position.lock().unwrap() = UserPosition {
            deposited_amount: Amount::from_base_units(5),
            deposit_timestamp: 1_000,
        };
        let controller = controller(wallet.clone(), reader.clone());
        controller.connect().await.unwrap();

        *wallet.account.lock().unwrap() = Ok(Account::new(BOB));
        *reader.position.lock().unwrap() = UserPosition::default();
        controller.connect().await.unwrap();

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.connected_account, Some(Account::new(BOB)));
        assert_eq!(snapshot.unlock_status, Some(UnlockStatus::NoDeposit));
    }

    #[tokio::test]
    async fn test_command_requires_connection() {
        let wallet = Arc::new(MockWallet::new(ALICE));
        let controller = controller(wallet.clone(), Arc::new(MockReader::new()));

        assert_eq!(controller.submit_withdraw().await, Err(StakeError::NotConnected));
        assert!(wallet.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_success_refreshes_position() {
        let wallet = Arc::new(MockWallet::new(ALICE));
        let reader = Arc::new(MockReader::new());
        let controller = controller(wallet.clone(), reader.clone());
        controller.connect().await.unwrap();

        // The ledger reflects the deposit once it is confirmed.
        *reader.position.lock().unwrap() = UserPosition {
            deposited_amount: Amount::from_base_units(5_000_000_000_000_000_000),
            deposit_timestamp: 1_000,
        };
        let confirmation = controller.submit_deposit("5").await.unwrap();

        assert_eq!(confirmation.tx_hash, "0xabc");
        assert!(!controller.is_command_pending().await);
        let snapshot = controller.snapshot().await;
        assert_eq!(
            snapshot.user_position.map(|p| p.deposited_amount),
            Some(Amount::from_base_units(5_000_000_000_000_000_000))
        );
    }

    #[tokio::test]
    async fn test_failed_command_returns_to_idle_and_reports_event() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let wallet = Arc::new(MockWallet::new(ALICE));
        *wallet.submit_failure.lock().unwrap() = Some(RawFailure::new(
            "UNPREDICTABLE_GAS_LIMIT",
            "cannot estimate gas",
        ));
        let controller =
            controller(wallet, Arc::new(MockReader::new())).with_event_sink(sender);
        controller.connect().await.unwrap();

        let result = controller.submit_withdraw().await;

        assert_eq!(result, Err(StakeError::GasEstimationFailed));
        assert!(!controller.is_command_pending().await);
        let failed = std::iter::from_fn(|| events.try_recv().ok()).find_map(|event| match event {
            SessionEvent::CommandFailed { command, error } => Some((command, error)),
            _ => None,
        });
        assert_eq!(
            failed,
            Some((CommandKind::Withdraw, StakeError::GasEstimationFailed))
        );
    }

    #[tokio::test]
    async fn test_refresh_failure_after_confirmation_keeps_success() {
        let (sender, mut events) = mpsc::unbounded_channel();
        let reader = Arc::new(MockReader::new());
        let controller = controller(Arc::new(MockWallet::new(ALICE)), reader.clone())
            .with_event_sink(sender);
        controller.connect().await.unwrap();
        let before = controller.snapshot().await;

        *reader.pool.lock().unwrap() = Err(RawFailure::with_reason("node offline"));
        let result = controller.submit_deposit("1").await;

        assert!(result.is_ok());
        assert_eq!(controller.snapshot().await, before);
        assert!(
            std::iter::from_fn(|| events.try_recv().ok())
                .any(|event| matches!(event, SessionEvent::RefreshFailed { .. }))
        );
    }

    #[tokio::test]
    async fn test_second_command_while_pending_is_rejected() {
        let gate = Arc::new(Notify::new());
        let wallet = Arc::new(MockWallet {
            gate: Some(gate.clone()),
            ..MockWallet::new(ALICE)
        });
        let controller = Arc::new(controller(wallet.clone(), Arc::new(MockReader::new())));
        controller.connect().await.unwrap();

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit_deposit("1").await })
        };
        while !controller.is_command_pending().await {
            tokio::task::yield_now().await;
        }
        let before = controller.snapshot().await;

        assert_eq!(
            controller.submit_deposit("2").await,
            Err(StakeError::CommandInProgress)
        );
        assert!(
            controller
                .submit_withdraw()
                .await
                .is_err_and(|err| err.is_command_in_progress())
        );

        let after = controller.snapshot().await;
        assert_eq!(after.pool_state, before.pool_state);
        assert_eq!(after.user_position, before.user_position);
        assert_eq!(after.pending_command, before.pending_command);

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(wallet.submitted.lock().unwrap().len(), 1);
        assert!(!controller.is_command_pending().await);
    }
}
