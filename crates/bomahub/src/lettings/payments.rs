use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    EngineError, Payment, PaymentId, PaymentStatus, Principal, SettlementDetails, TenantId,
};
use super::store::{LettingsStore, UnitOfWork};

/// Days after a settled rent charge's due date that the next one falls due.
const RENT_PERIOD_DAYS: i64 = 30;

/// Batch settlement request: every listed payment must belong to the
/// named tenant or the whole batch is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessPaymentRequest {
    pub tenant_id: TenantId,
    pub pending_payment_ids: Vec<PaymentId>,
    #[serde(flatten)]
    pub settlement: SettlementDetails,
}

/// Advances payment status and materializes the next rent charge at
/// settlement time. There is no background scheduler; settling the
/// current rent invoice is the only thing that creates the next one.
pub struct PaymentScheduler<S> {
    store: Arc<S>,
}

impl<S> PaymentScheduler<S>
where
    S: LettingsStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Moves a payment to `status`. Marking a pending or overdue payment
    /// paid stamps the settlement details and triggers the rent rollover;
    /// re-marking an already-paid payment is a no-op that neither
    /// overwrites the stamped fields nor rolls over again.
    pub fn update_payment_status(
        &self,
        principal: &Principal,
        id: PaymentId,
        status: PaymentStatus,
        details: Option<&SettlementDetails>,
    ) -> Result<Payment, EngineError> {
        let payment = self
            .store
            .transaction(|uow| apply_status(uow, id, status, details))?;

        info!(
            actor = %principal.subject,
            payment = %payment.id,
            status = payment.status.label(),
            "payment status updated"
        );

        Ok(payment)
    }

    /// Settles a batch of payments on behalf of a tenant. Each payment's
    /// tenancy must belong to the tenant; one foreign payment fails the
    /// whole batch with nothing committed. Returns the settled ids in
    /// input order.
    pub fn process_payment(
        &self,
        principal: &Principal,
        request: &ProcessPaymentRequest,
    ) -> Result<Vec<PaymentId>, EngineError> {
        let processed = self.store.transaction(|uow| {
            let mut processed = Vec::with_capacity(request.pending_payment_ids.len());

            for payment_id in &request.pending_payment_ids {
                let payment = uow
                    .payment(*payment_id)
                    .ok_or_else(|| EngineError::not_found("payment", payment_id.0))?;
                let tenancy = uow
                    .tenancy(payment.tenancy_id)
                    .ok_or_else(|| EngineError::not_found("tenancy", payment.tenancy_id.0))?;

                if tenancy.tenant_id != request.tenant_id {
                    return Err(EngineError::ForeignPayment {
                        payment: *payment_id,
                        tenant: request.tenant_id,
                    });
                }

                apply_status(
                    uow,
                    *payment_id,
                    PaymentStatus::Paid,
                    Some(&request.settlement),
                )?;
                processed.push(*payment_id);
            }

            Ok(processed)
        })?;

        info!(
            actor = %principal.subject,
            tenant = %request.tenant_id,
            count = processed.len(),
            "payment batch processed"
        );

        Ok(processed)
    }
}

fn apply_status(
    uow: &mut dyn UnitOfWork,
    id: PaymentId,
    status: PaymentStatus,
    details: Option<&SettlementDetails>,
) -> Result<Payment, EngineError> {
    let mut payment = uow
        .payment(id)
        .ok_or_else(|| EngineError::not_found("payment", id.0))?;

    if status == PaymentStatus::Paid {
        // Settlement is terminal; a second paid transition must not
        // restamp fields or produce another rollover.
        if payment.status == PaymentStatus::Paid {
            return Ok(payment);
        }

        let details = details.ok_or(EngineError::SettlementRequired(id))?;
        payment.status = PaymentStatus::Paid;
        payment.payment_date = Some(details.payment_date);
        payment.payment_method = Some(details.payment_method.clone());
        payment.reference_number = Some(details.reference_number.clone());
        uow.save_payment(payment.clone());

        schedule_next_rent_payment(uow, &payment);
        return Ok(payment);
    }

    payment.status = status;
    uow.save_payment(payment.clone());
    Ok(payment)
}

/// Rollover rule: settling a rent charge (description contains "rent",
/// case-insensitive, which excludes security deposits) creates the next
/// period's pending invoice 30 days after the settled due date, same
/// amount and references.
fn schedule_next_rent_payment(uow: &mut dyn UnitOfWork, settled: &Payment) {
    if !settled.description.to_lowercase().contains("rent") {
        return;
    }

    let next = Payment {
        id: PaymentId(uow.next_id()),
        tenancy_id: settled.tenancy_id,
        property_id: settled.property_id,
        amount: settled.amount,
        description: "Monthly Rent".to_string(),
        due_date: settled.due_date + Duration::days(RENT_PERIOD_DAYS),
        payment_date: None,
        payment_method: None,
        reference_number: None,
        status: PaymentStatus::Pending,
    };
    uow.save_payment(next);
}
