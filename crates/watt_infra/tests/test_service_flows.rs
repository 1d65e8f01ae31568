//! Store-backed service flows: round trips, rejections, journal contents,
//! and metrics.

use rust_decimal_macros::dec;
use uuid::Uuid;
use watt_core::lifecycle::LifecycleError;
use watt_core::machine::TransitionError;
use watt_core::order::{OrderEvent, OrderState, PaymentType};
use watt_infra::config::ServiceConfig;
use watt_infra::service::{ChargingOrderService, ServiceError};
use watt_infra::store::{JournalEventKind, JournalState, StoreError};

fn service() -> ChargingOrderService {
    ChargingOrderService::new(ServiceConfig::default()).unwrap()
}

// ─── Round trips ──────────────────────────────────────────────────────────

#[test]
fn test_prepaid_flow_through_service() {
    let svc = service();
    let order = svc
        .create_order("user-1", "pile-7", PaymentType::PrePaid)
        .unwrap();
    let id = order.order_id;
    assert!(svc.order_exists(&id));

    svc.pay(&id, dec!(100.00)).unwrap();
    svc.start_charging(&id).unwrap();
    svc.finish_charging(&id, dec!(50.5), dec!(60.00)).unwrap();
    let closed = svc.settle(&id).unwrap();

    assert_eq!(closed.state, OrderState::Closed);
    assert_eq!(closed.refund_amount, Some(dec!(40.00)));

    // The stored snapshot is the committed one.
    assert_eq!(svc.find_order(&id), Some(closed));
    assert_eq!(svc.metrics().transitions_committed_total(), 4);
    assert_eq!(svc.metrics().rejections_total(), 0);
}

#[test]
fn test_postpaid_flow_through_service() {
    let svc = service();
    let order = svc
        .create_order("user-2", "pile-3", PaymentType::PostPaid)
        .unwrap();
    let id = order.order_id;

    svc.authorize(&id).unwrap();
    svc.start_charging(&id).unwrap();
    svc.finish_charging(&id, dec!(45.8), dec!(55.00)).unwrap();
    let closed = svc.deduct(&id).unwrap();

    assert_eq!(closed.state, OrderState::Closed);
    assert_eq!(closed.actual_amount, Some(dec!(55.00)));
    assert_eq!(closed.prepaid_amount, None);
}

#[test]
fn test_cancel_through_service() {
    let svc = service();
    let order = svc
        .create_order("user-1", "pile-1", PaymentType::PostPaid)
        .unwrap();
    let cancelled = svc.cancel_order(&order.order_id).unwrap();
    assert_eq!(cancelled.state, OrderState::Cancelled);
}

// ─── Rejections ───────────────────────────────────────────────────────────

#[test]
fn test_unknown_order_id() {
    let svc = service();
    let id = Uuid::new_v4();
    let err = svc.start_charging(&id).unwrap_err();
    assert_eq!(err, ServiceError::NotFound { order_id: id });
}

#[test]
fn test_cross_mode_rejection_leaves_stored_order_unchanged() {
    let svc = service();
    let order = svc
        .create_order("user-1", "pile-1", PaymentType::PrePaid)
        .unwrap();
    let id = order.order_id;

    let err = svc.authorize(&id).unwrap_err();
    assert_eq!(
        err,
        ServiceError::Lifecycle(LifecycleError::PaymentTypeMismatch {
            expected: PaymentType::PostPaid,
            actual: PaymentType::PrePaid,
        })
    );
    assert_eq!(svc.find_order(&id), Some(order));
    assert_eq!(svc.metrics().rejections_total(), 1);
    assert_eq!(svc.metrics().transitions_committed_total(), 0);
}

#[test]
fn test_invalid_transition_through_service() {
    let svc = service();
    let order = svc
        .create_order("user-1", "pile-1", PaymentType::PrePaid)
        .unwrap();
    let id = order.order_id;

    let err = svc.settle(&id).unwrap_err();
    assert_eq!(
        err,
        ServiceError::Lifecycle(LifecycleError::Transition(
            TransitionError::InvalidTransition {
                state: OrderState::Created,
                event: OrderEvent::Settle,
            }
        ))
    );
    assert_eq!(svc.find_order(&id), Some(order));
}

#[test]
fn test_store_capacity_surfaces_through_create() {
    let svc = ChargingOrderService::new(ServiceConfig {
        store_capacity: Some(1),
        journal_path: None,
    })
    .unwrap();

    svc.create_order("user-1", "pile-1", PaymentType::PrePaid)
        .unwrap();
    let err = svc
        .create_order("user-2", "pile-2", PaymentType::PrePaid)
        .unwrap_err();
    assert_eq!(err, ServiceError::Store(StoreError::CapacityFull));
}

#[test]
fn test_delete_order() {
    let svc = service();
    let order = svc
        .create_order("user-1", "pile-1", PaymentType::PrePaid)
        .unwrap();
    assert!(svc.delete_order(&order.order_id));
    assert!(!svc.order_exists(&order.order_id));
    assert!(!svc.delete_order(&order.order_id));
}

// ─── Journal ──────────────────────────────────────────────────────────────

#[test]
fn test_journal_records_committed_transitions_only() {
    let svc = service();
    let order = svc
        .create_order("user-1", "pile-1", PaymentType::PrePaid)
        .unwrap();
    let id = order.order_id;

    // One rejection (not journaled), then the full flow.
    let _ = svc.settle(&id).unwrap_err();
    svc.pay(&id, dec!(100.00)).unwrap();
    svc.start_charging(&id).unwrap();
    svc.finish_charging(&id, dec!(50.5), dec!(60.00)).unwrap();
    svc.settle(&id).unwrap();

    let records = svc.journal_records();
    assert_eq!(records.len(), 4);

    let steps: Vec<_> = records
        .iter()
        .map(|r| (r.event, r.from, r.to))
        .collect();
    assert_eq!(
        steps,
        vec![
            (
                JournalEventKind::Pay,
                JournalState::Created,
                JournalState::Paid
            ),
            (
                JournalEventKind::StartCharging,
                JournalState::Paid,
                JournalState::Charging
            ),
            (
                JournalEventKind::FinishCharging,
                JournalState::Charging,
                JournalState::Completed
            ),
            (
                JournalEventKind::Settle,
                JournalState::Completed,
                JournalState::Closed
            ),
        ]
    );
    assert!(records.iter().all(|r| r.order_id == id));
    // Rejections consume no sequence numbers; commits are dense and ordered.
    let seqs: Vec<_> = records.iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3]);

    let summary = svc.journal_replay();
    assert_eq!(summary.records_replayed, 4);
    assert!(summary.open_order_ids.is_empty(), "order reached CLOSED");
}

#[test]
fn test_journal_replay_reports_open_orders() {
    let svc = service();
    let order = svc
        .create_order("user-1", "pile-1", PaymentType::PostPaid)
        .unwrap();
    let id = order.order_id;

    svc.authorize(&id).unwrap();
    svc.start_charging(&id).unwrap();

    let summary = svc.journal_replay();
    assert_eq!(summary.records_replayed, 2);
    assert_eq!(summary.open_order_ids, vec![id]);
}
