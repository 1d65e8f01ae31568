//! Bounded in-memory order store.
//!
//! Keyed by `order_id`. The read-modify-write sequence "read current state,
//! fire event, commit new state" must be one atomic unit per order id;
//! [`OrderStore::update_with`] provides that by holding the store lock
//! across the whole sequence, so two racers can never both observe the same
//! pre-transition state and each commit. A plain get-then-put over a
//! concurrent map would not give this guarantee.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use uuid::Uuid;
use watt_core::order::ChargingOrder;

// --- Store errors ---------------------------------------------------------

/// Error from plain store writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store is at capacity.
    CapacityFull,
    /// An order with this id is already stored.
    AlreadyExists { order_id: Uuid },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityFull => write!(f, "order store at capacity"),
            Self::AlreadyExists { order_id } => {
                write!(f, "order already exists: {order_id}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Error from [`OrderStore::update_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateError<E> {
    /// No order stored under this id.
    NotFound { order_id: Uuid },
    /// The update closure rejected the transition; the stored order is
    /// unchanged.
    Rejected(E),
}

impl<E: fmt::Display> fmt::Display for UpdateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { order_id } => write!(f, "order not found: {order_id}"),
            Self::Rejected(err) => write!(f, "update rejected: {err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for UpdateError<E> {}

// --- Order store ------------------------------------------------------------

/// Thread-safe in-memory order store with bounded capacity.
#[derive(Debug)]
pub struct OrderStore {
    orders: Mutex<HashMap<Uuid, ChargingOrder>>,
    capacity: usize,
}

impl OrderStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            orders: Mutex::new(HashMap::with_capacity(capacity)),
            capacity,
        }
    }

    /// Store a freshly created order. Rejects duplicates and respects the
    /// capacity bound.
    pub fn insert_new(&self, order: ChargingOrder) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().expect("order store mutex poisoned");
        if orders.contains_key(&order.order_id) {
            return Err(StoreError::AlreadyExists {
                order_id: order.order_id,
            });
        }
        if orders.len() >= self.capacity {
            return Err(StoreError::CapacityFull);
        }
        orders.insert(order.order_id, order);
        Ok(())
    }

    /// Upsert an order snapshot. New keys respect the capacity bound.
    pub fn save(&self, order: ChargingOrder) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().expect("order store mutex poisoned");
        if !orders.contains_key(&order.order_id) && orders.len() >= self.capacity {
            return Err(StoreError::CapacityFull);
        }
        orders.insert(order.order_id, order);
        Ok(())
    }

    pub fn find_by_id(&self, order_id: &Uuid) -> Option<ChargingOrder> {
        self.orders
            .lock()
            .expect("order store mutex poisoned")
            .get(order_id)
            .cloned()
    }

    /// Remove an order. Returns whether it was present.
    pub fn delete(&self, order_id: &Uuid) -> bool {
        self.orders
            .lock()
            .expect("order store mutex poisoned")
            .remove(order_id)
            .is_some()
    }

    pub fn exists(&self, order_id: &Uuid) -> bool {
        self.orders
            .lock()
            .expect("order store mutex poisoned")
            .contains_key(order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.lock().expect("order store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Atomic read-modify-write for one order.
    ///
    /// The store lock is held across read -> `f` -> commit, so concurrent
    /// updates to the same id are fully serialized: exactly one racer can
    /// commit a given transition, the rest observe the post-transition
    /// state. If `f` rejects, the stored order is left unchanged and the
    /// rejection is passed through.
    pub fn update_with<E, F>(&self, order_id: &Uuid, f: F) -> Result<ChargingOrder, UpdateError<E>>
    where
        F: FnOnce(&ChargingOrder) -> Result<ChargingOrder, E>,
    {
        let mut orders = self.orders.lock().expect("order store mutex poisoned");
        let current = orders.get(order_id).ok_or(UpdateError::NotFound {
            order_id: *order_id,
        })?;

        let next = f(current).map_err(UpdateError::Rejected)?;
        orders.insert(*order_id, next.clone());
        Ok(next)
    }
}
