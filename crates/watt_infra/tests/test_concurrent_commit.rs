//! Racing callers against one order: exactly one commit per legal event.

use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal_macros::dec;
use watt_core::lifecycle::LifecycleError;
use watt_core::machine::TransitionError;
use watt_core::order::{OrderEvent, OrderState, PaymentType};
use watt_infra::config::ServiceConfig;
use watt_infra::service::{ChargingOrderService, ServiceError};

#[test]
fn test_racers_on_same_event_commit_exactly_once() {
    let svc = Arc::new(ChargingOrderService::new(ServiceConfig::default()).unwrap());
    let order = svc
        .create_order("user-1", "pile-1", PaymentType::PrePaid)
        .unwrap();
    let id = order.order_id;

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = Vec::new();
    for _ in 0..threads {
        let svc = Arc::clone(&svc);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            svc.pay(&id, dec!(100.00))
        }));
    }

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one racer may commit PAY");

    // The losers observed the post-transition state: PAY is not legal from
    // PAID, so each got the same typed rejection.
    for result in results.iter().filter(|r| r.is_err()) {
        assert_eq!(
            *result,
            Err(ServiceError::Lifecycle(LifecycleError::Transition(
                TransitionError::InvalidTransition {
                    state: OrderState::Paid,
                    event: OrderEvent::Pay,
                }
            )))
        );
    }

    let stored = svc.find_order(&id).unwrap();
    assert_eq!(stored.state, OrderState::Paid);
    assert_eq!(stored.prepaid_amount, Some(dec!(100.00)));

    // One commit, N-1 rejections, one journal entry — nothing lost, nothing
    // duplicated.
    assert_eq!(svc.metrics().transitions_committed_total(), 1);
    assert_eq!(svc.metrics().rejections_total(), (threads - 1) as u64);
    assert_eq!(svc.journal_records().len(), 1);
}

#[test]
fn test_racers_across_distinct_orders_all_commit() {
    let svc = Arc::new(ChargingOrderService::new(ServiceConfig::default()).unwrap());

    let ids: Vec<_> = (0..8)
        .map(|i| {
            svc.create_order(&format!("user-{i}"), "pile-1", PaymentType::PostPaid)
                .unwrap()
                .order_id
        })
        .collect();

    let barrier = Arc::new(Barrier::new(ids.len()));
    let mut handles = Vec::new();
    for id in ids.clone() {
        let svc = Arc::clone(&svc);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            svc.authorize(&id)
        }));
    }
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    for id in &ids {
        assert_eq!(svc.find_order(id).unwrap().state, OrderState::Authorized);
    }
    assert_eq!(svc.metrics().transitions_committed_total(), ids.len() as u64);
}
