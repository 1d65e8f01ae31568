//! Store-backed charging order service.
//!
//! One id-keyed method per lifecycle operation. Each mutating call is a
//! single [`OrderStore::update_with`] round trip, so the read -> fire ->
//! commit sequence for one order is atomic; committed transitions are then
//! journaled and counted. Rejections surface to the caller as typed errors
//! with the stored order unchanged.

use std::fmt;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use uuid::Uuid;
use watt_core::lifecycle::{LifecycleError, OrderLifecycle};
use watt_core::order::{ChargingOrder, OrderEvent, PaymentType};

use crate::config::{InvalidConfigError, ServiceConfig, resolve_store_capacity};
use crate::store::journal::{ReplaySummary, TransitionJournal, TransitionRecord};
use crate::store::order_store::{OrderStore, StoreError, UpdateError};

// --- Errors -----------------------------------------------------------------

/// Error from a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No order stored under this id.
    NotFound { order_id: Uuid },
    /// The store rejected a write.
    Store(StoreError),
    /// The lifecycle rejected the operation; nothing was committed.
    Lifecycle(LifecycleError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { order_id } => write!(f, "order not found: {order_id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Lifecycle(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Lifecycle(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<LifecycleError> for ServiceError {
    fn from(err: LifecycleError) -> Self {
        Self::Lifecycle(err)
    }
}

impl From<UpdateError<LifecycleError>> for ServiceError {
    fn from(err: UpdateError<LifecycleError>) -> Self {
        match err {
            UpdateError::NotFound { order_id } => Self::NotFound { order_id },
            UpdateError::Rejected(err) => Self::Lifecycle(err),
        }
    }
}

/// Error constructing the service.
#[derive(Debug)]
pub enum ServiceInitError {
    Config(InvalidConfigError),
    Journal(io::Error),
}

impl fmt::Display for ServiceInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Journal(err) => write!(f, "failed to open transition journal: {err}"),
        }
    }
}

impl std::error::Error for ServiceInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Journal(err) => Some(err),
        }
    }
}

impl From<InvalidConfigError> for ServiceInitError {
    fn from(err: InvalidConfigError) -> Self {
        Self::Config(err)
    }
}

// --- Metrics ------------------------------------------------------------

/// Observability counters for the service.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    transitions_committed_total: AtomicU64,
    rejections_total: AtomicU64,
    journal_write_errors: AtomicU64,
}

impl ServiceMetrics {
    fn record_committed(&self) {
        self.transitions_committed_total
            .fetch_add(1, Ordering::Relaxed);
    }

    fn record_rejection(&self) {
        self.rejections_total.fetch_add(1, Ordering::Relaxed);
    }

    fn record_journal_write_error(&self) {
        self.journal_write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transitions_committed_total(&self) -> u64 {
        self.transitions_committed_total.load(Ordering::Relaxed)
    }

    pub fn rejections_total(&self) -> u64 {
        self.rejections_total.load(Ordering::Relaxed)
    }

    pub fn journal_write_errors(&self) -> u64 {
        self.journal_write_errors.load(Ordering::Relaxed)
    }
}

// --- Service ------------------------------------------------------------

/// Orchestrates order lifecycle operations over the store and journal.
#[derive(Debug)]
pub struct ChargingOrderService {
    lifecycle: OrderLifecycle,
    store: OrderStore,
    journal: Mutex<TransitionJournal>,
    commit_seq: AtomicU64,
    metrics: ServiceMetrics,
}

impl ChargingOrderService {
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceInitError> {
        let capacity = resolve_store_capacity(config.store_capacity)?;
        let journal = match &config.journal_path {
            Some(path) => {
                TransitionJournal::with_storage_path(path).map_err(ServiceInitError::Journal)?
            }
            None => TransitionJournal::in_memory(),
        };
        let commit_seq = AtomicU64::new(journal.next_seq());

        Ok(Self {
            lifecycle: OrderLifecycle::standard(),
            store: OrderStore::new(capacity),
            journal: Mutex::new(journal),
            commit_seq,
            metrics: ServiceMetrics::default(),
        })
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    // --- Creation and queries ------------------------------------------

    /// Create an order in `Created` and persist it.
    pub fn create_order(
        &self,
        user_id: &str,
        charging_pile_id: &str,
        payment_type: PaymentType,
    ) -> Result<ChargingOrder, ServiceError> {
        let order = self
            .lifecycle
            .create_order(user_id, charging_pile_id, payment_type);
        self.store.insert_new(order.clone())?;
        Ok(order)
    }

    pub fn find_order(&self, order_id: &Uuid) -> Option<ChargingOrder> {
        self.store.find_by_id(order_id)
    }

    pub fn order_exists(&self, order_id: &Uuid) -> bool {
        self.store.exists(order_id)
    }

    /// Remove an order from the store. Returns whether it was present.
    pub fn delete_order(&self, order_id: &Uuid) -> bool {
        self.store.delete(order_id)
    }

    // --- Lifecycle operations --------------------------------------------

    /// Take the deposit and fire PAY. PrePaid orders only.
    pub fn pay(
        &self,
        order_id: &Uuid,
        prepaid_amount: Decimal,
    ) -> Result<ChargingOrder, ServiceError> {
        self.transition(order_id, OrderEvent::Pay, |order| {
            self.lifecycle.pay(order, prepaid_amount)
        })
    }

    /// Place the credit hold and fire AUTHORIZE. PostPaid orders only.
    pub fn authorize(&self, order_id: &Uuid) -> Result<ChargingOrder, ServiceError> {
        self.transition(order_id, OrderEvent::Authorize, |order| {
            self.lifecycle.authorize(order)
        })
    }

    /// Fire START_CHARGING for either mode.
    pub fn start_charging(&self, order_id: &Uuid) -> Result<ChargingOrder, ServiceError> {
        self.transition(order_id, OrderEvent::StartCharging, |order| {
            self.lifecycle.start_charging(order)
        })
    }

    /// Record the session's energy and cost, then fire FINISH_CHARGING.
    pub fn finish_charging(
        &self,
        order_id: &Uuid,
        charging_amount: Decimal,
        order_amount: Decimal,
    ) -> Result<ChargingOrder, ServiceError> {
        self.transition(order_id, OrderEvent::FinishCharging, |order| {
            self.lifecycle
                .finish_charging(order, charging_amount, order_amount)
        })
    }

    /// Settle the deposit and fire SETTLE. PrePaid orders only.
    pub fn settle(&self, order_id: &Uuid) -> Result<ChargingOrder, ServiceError> {
        self.transition(order_id, OrderEvent::Settle, |order| {
            self.lifecycle.settle(order)
        })
    }

    /// Collect the actual cost and fire DEDUCT. PostPaid orders only.
    pub fn deduct(&self, order_id: &Uuid) -> Result<ChargingOrder, ServiceError> {
        self.transition(order_id, OrderEvent::Deduct, |order| {
            self.lifecycle.deduct(order)
        })
    }

    /// Fire CANCEL_ORDER (legal only from CREATED in both modes).
    pub fn cancel_order(&self, order_id: &Uuid) -> Result<ChargingOrder, ServiceError> {
        self.transition(order_id, OrderEvent::CancelOrder, |order| {
            self.lifecycle.cancel_order(order)
        })
    }

    // --- Journal access -------------------------------------------------

    /// Snapshot of all journaled transitions.
    pub fn journal_records(&self) -> Vec<TransitionRecord> {
        self.journal
            .lock()
            .expect("transition journal mutex poisoned")
            .records()
            .to_vec()
    }

    /// Replay the journal into a per-order summary.
    pub fn journal_replay(&self) -> ReplaySummary {
        self.journal
            .lock()
            .expect("transition journal mutex poisoned")
            .replay()
    }

    // --- Internals ---------------------------------------------------------

    /// Run one lifecycle operation as an atomic store update, then journal
    /// the committed transition.
    fn transition<F>(
        &self,
        order_id: &Uuid,
        event: OrderEvent,
        f: F,
    ) -> Result<ChargingOrder, ServiceError>
    where
        F: FnOnce(&ChargingOrder) -> Result<ChargingOrder, LifecycleError>,
    {
        let mut from_state = None;
        let mut seq = 0;
        let result = self.store.update_with(order_id, |order| {
            from_state = Some(order.state);
            let next = f(order)?;
            // Allocated while the store lock is still held: replay reduces
            // by sequence, so two commits on one order stay ordered even if
            // their journal appends land inverted.
            seq = self.commit_seq.fetch_add(1, Ordering::Relaxed);
            Ok(next)
        });

        match result {
            Ok(updated) => {
                self.metrics.record_committed();
                if let Some(from) = from_state {
                    self.journal_committed(TransitionRecord::committed(&updated, from, event, seq));
                }
                Ok(updated)
            }
            Err(err) => {
                if matches!(err, UpdateError::Rejected(_)) {
                    self.metrics.record_rejection();
                }
                Err(err.into())
            }
        }
    }

    /// Journal append failures are counted and logged; they never unwind a
    /// transition that is already committed in the store.
    fn journal_committed(&self, record: TransitionRecord) {
        let mut journal = self
            .journal
            .lock()
            .expect("transition journal mutex poisoned");
        if let Err(err) = journal.append(record) {
            self.metrics.record_journal_write_error();
            tracing::warn!("Transition journal append failed: {err}");
        }
    }
}
