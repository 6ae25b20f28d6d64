use super::common::*;
use crate::lettings::domain::{
    EngineError, Payment, PaymentId, PaymentStatus, TenantId,
};
use crate::lettings::payments::ProcessPaymentRequest;
use crate::lettings::store::{LettingsStore, UnitOfWork};
use chrono::NaiveDate;
use std::sync::Arc;

struct Lease {
    tenant_id: TenantId,
    deposit: Payment,
    rent: Payment,
}

/// One tenancy on unit A01 with its two bootstrap charges.
fn leased_unit(
    store: &Arc<crate::lettings::store::MemoryStore>,
    engine: &crate::lettings::engine::LettingsEngine<crate::lettings::store::MemoryStore>,
) -> Lease {
    let built = seeded_property(engine);
    let a01 = unit_by_number(&built, "A01");
    let tenant_id = engine
        .tenancy
        .create_complete_tenancy(&principal(), &tenancy_request(built.property.id, vec![a01]))
        .expect("tenancy creation succeeds");

    store
        .read(|uow| {
            let tenancy = uow.active_tenancy_for_unit(a01).expect("active tenancy");
            let payments = uow.payments_by_tenancy(tenancy.id);
            let deposit = payments
                .iter()
                .find(|payment| payment.description.contains("Deposit"))
                .expect("deposit exists")
                .clone();
            let rent = payments
                .iter()
                .find(|payment| payment.description.starts_with("Rent"))
                .expect("rent exists")
                .clone();
            Ok(Lease {
                tenant_id,
                deposit,
                rent,
            })
        })
        .expect("read succeeds")
}

#[test]
fn settling_rent_rolls_over_the_next_invoice() {
    let (store, engine) = engine();
    let lease = leased_unit(&store, &engine);

    // First rent: "Rent - March 2024", due 2024-03-06 (start + 5 days).
    let settled = engine
        .payments
        .update_payment_status(
            &principal(),
            lease.rent.id,
            PaymentStatus::Paid,
            Some(&settlement()),
        )
        .expect("settlement succeeds");

    assert_eq!(settled.status, PaymentStatus::Paid);
    assert_eq!(settled.payment_date, Some(settlement().payment_date));
    assert_eq!(settled.payment_method.as_deref(), Some("MPESA"));
    assert_eq!(settled.reference_number.as_deref(), Some("QX12AB34CD"));

    let rollover = store
        .read(|uow| {
            let payments = uow.payments_by_tenancy(lease.rent.tenancy_id);
            Ok(payments
                .into_iter()
                .find(|payment| payment.description == "Monthly Rent")
                .expect("rollover created"))
        })
        .expect("read succeeds");

    assert_eq!(rollover.status, PaymentStatus::Pending);
    assert_eq!(rollover.amount, lease.rent.amount);
    assert_eq!(
        rollover.due_date,
        NaiveDate::from_ymd_opt(2024, 4, 5).expect("valid date"),
        "next invoice falls due 30 days after the settled due date"
    );
    assert_eq!(rollover.tenancy_id, lease.rent.tenancy_id);
    assert_eq!(rollover.property_id, lease.rent.property_id);
    assert_eq!(rollover.payment_date, None);
}

#[test]
fn settling_a_deposit_creates_no_rollover() {
    let (store, engine) = engine();
    let lease = leased_unit(&store, &engine);

    engine
        .payments
        .update_payment_status(
            &principal(),
            lease.deposit.id,
            PaymentStatus::Paid,
            Some(&settlement()),
        )
        .expect("settlement succeeds");

    let count = store
        .read(|uow| Ok(uow.payments_by_tenancy(lease.deposit.tenancy_id).len()))
        .expect("read succeeds");
    assert_eq!(count, 2, "deposit settlement must not add an invoice");
}

#[test]
fn settlement_is_idempotent() {
    let (store, engine) = engine();
    let lease = leased_unit(&store, &engine);

    engine
        .payments
        .update_payment_status(
            &principal(),
            lease.rent.id,
            PaymentStatus::Paid,
            Some(&settlement()),
        )
        .expect("first settlement succeeds");

    let late = crate::lettings::domain::SettlementDetails {
        payment_date: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
        payment_method: "CASH".to_string(),
        reference_number: "DUPLICATE".to_string(),
    };
    let second = engine
        .payments
        .update_payment_status(&principal(), lease.rent.id, PaymentStatus::Paid, Some(&late))
        .expect("second settlement is a no-op");

    // Stamped fields keep the first settlement's values.
    assert_eq!(second.payment_date, Some(settlement().payment_date));
    assert_eq!(second.payment_method.as_deref(), Some("MPESA"));

    let rollovers = store
        .read(|uow| {
            Ok(uow
                .payments_by_tenancy(lease.rent.tenancy_id)
                .into_iter()
                .filter(|payment| payment.description == "Monthly Rent")
                .count())
        })
        .expect("read succeeds");
    assert_eq!(rollovers, 1, "double settlement must not roll over twice");
}

#[test]
fn marking_paid_without_details_fails() {
    let (store, engine) = engine();
    let lease = leased_unit(&store, &engine);

    match engine
        .payments
        .update_payment_status(&principal(), lease.rent.id, PaymentStatus::Paid, None)
    {
        Err(EngineError::SettlementRequired(id)) => assert_eq!(id, lease.rent.id),
        other => panic!("expected settlement required, got {other:?}"),
    }

    let status = store
        .read(|uow| Ok(uow.payment(lease.rent.id).expect("payment exists").status))
        .expect("read succeeds");
    assert_eq!(status, PaymentStatus::Pending);
}

#[test]
fn non_paid_status_changes_persist_directly() {
    let (store, engine) = engine();
    let lease = leased_unit(&store, &engine);

    let overdue = engine
        .payments
        .update_payment_status(&principal(), lease.rent.id, PaymentStatus::Overdue, None)
        .expect("overdue update succeeds");
    assert_eq!(overdue.status, PaymentStatus::Overdue);
    assert_eq!(overdue.payment_date, None);

    let count = store
        .read(|uow| Ok(uow.payments_by_tenancy(lease.rent.tenancy_id).len()))
        .expect("read succeeds");
    assert_eq!(count, 2, "overdue transition must not roll over");

    // An overdue rent invoice can still be settled and then rolls over.
    engine
        .payments
        .update_payment_status(
            &principal(),
            lease.rent.id,
            PaymentStatus::Paid,
            Some(&settlement()),
        )
        .expect("settling an overdue invoice succeeds");
    let count = store
        .read(|uow| Ok(uow.payments_by_tenancy(lease.rent.tenancy_id).len()))
        .expect("read succeeds");
    assert_eq!(count, 3);
}

#[test]
fn unknown_payment_fails_not_found() {
    let (_, engine) = engine();

    match engine.payments.update_payment_status(
        &principal(),
        PaymentId(808),
        PaymentStatus::Paid,
        Some(&settlement()),
    ) {
        Err(EngineError::NotFound { entity: "payment", id: 808 }) => {}
        other => panic!("expected payment not found, got {other:?}"),
    }
}

#[test]
fn process_payment_settles_the_batch_in_input_order() {
    let (store, engine) = engine();
    let lease = leased_unit(&store, &engine);

    let request = ProcessPaymentRequest {
        tenant_id: lease.tenant_id,
        pending_payment_ids: vec![lease.rent.id, lease.deposit.id],
        settlement: settlement(),
    };
    let processed = engine
        .payments
        .process_payment(&principal(), &request)
        .expect("batch succeeds");

    assert_eq!(processed, vec![lease.rent.id, lease.deposit.id]);

    store
        .read(|uow| {
            assert_eq!(
                uow.payment(lease.rent.id).expect("rent exists").status,
                PaymentStatus::Paid
            );
            assert_eq!(
                uow.payment(lease.deposit.id).expect("deposit exists").status,
                PaymentStatus::Paid
            );
            // Rent rolled over, deposit did not.
            assert_eq!(uow.payments_by_tenancy(lease.rent.tenancy_id).len(), 3);
            Ok(())
        })
        .expect("read succeeds");
}

#[test]
fn foreign_payment_fails_the_whole_batch() {
    let (store, engine) = engine();
    let lease = leased_unit(&store, &engine);

    let request = ProcessPaymentRequest {
        tenant_id: TenantId(4321),
        pending_payment_ids: vec![lease.deposit.id, lease.rent.id],
        settlement: settlement(),
    };

    match engine.payments.process_payment(&principal(), &request) {
        Err(EngineError::ForeignPayment { payment, tenant }) => {
            assert_eq!(payment, lease.deposit.id);
            assert_eq!(tenant, TenantId(4321));
        }
        other => panic!("expected foreign payment error, got {other:?}"),
    }

    store
        .read(|uow| {
            // No payment in the batch changed status.
            assert_eq!(
                uow.payment(lease.deposit.id).expect("deposit exists").status,
                PaymentStatus::Pending
            );
            assert_eq!(
                uow.payment(lease.rent.id).expect("rent exists").status,
                PaymentStatus::Pending
            );
            assert_eq!(uow.payments_by_tenancy(lease.rent.tenancy_id).len(), 2);
            Ok(())
        })
        .expect("read succeeds");
}
