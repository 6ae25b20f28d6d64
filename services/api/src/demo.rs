use crate::infra::parse_date;
use bomahub::error::AppError;
use bomahub::lettings::{
    BuildPropertyRequest, CreateTenancyRequest, EngineError, LettingsEngine, LettingsStore,
    MemoryStore, OrganizationId, Principal, ProcessPaymentRequest, SettlementDetails, UnitOfWork,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Tenancy start date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    start_date: Option<NaiveDate>,
    /// Monthly rent for the demo tenancy
    #[arg(long, default_value_t = 25_000)]
    monthly_rent: u32,
}

/// Walks the whole lettings lifecycle against a fresh in-memory store and
/// prints each snapshot, so stakeholders can see the engine end to end
/// without standing up the HTTP service.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start_date = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());
    let principal = Principal {
        subject: "demo-operator".to_string(),
        organization_id: OrganizationId(1),
    };

    let store = Arc::new(MemoryStore::new());
    let engine = LettingsEngine::new(store.clone());

    println!("== Building property structure ==");
    let built = engine.structure.build(
        &principal,
        &BuildPropertyRequest {
            name: "Bomani Heights".to_string(),
            address: "Moi Avenue, Mombasa".to_string(),
            kind: Default::default(),
            floor_count: 2,
            units_per_floor: 4,
            start_floor: 1,
            custom_floor_units: Some(2),
        },
    )?;
    println!(
        "property {} with {} floors and {} units",
        built.property.name,
        built.floors.len(),
        built.units.len()
    );

    println!("\n== Creating tenancy on {} ==", built.units[0].unit_number);
    let tenant_id = engine.tenancy.create_complete_tenancy(
        &principal,
        &CreateTenancyRequest {
            property_id: built.property.id,
            unit_ids: vec![built.units[0].id],
            first_name: "Zawadi".to_string(),
            last_name: "Mwangi".to_string(),
            email: "zawadi.mwangi@example.com".to_string(),
            phone: "+254711000111".to_string(),
            id_number: "28990011".to_string(),
            emergency_contact: "Juma Mwangi +254711222333".to_string(),
            monthly_rent: args.monthly_rent,
            start_date,
        },
    )?;

    let pending = store.read(|uow| {
        let tenancy = uow
            .active_tenancy_for_unit(built.units[0].id)
            .ok_or_else(|| EngineError::not_found("active tenancy", built.units[0].id.0))?;
        Ok(uow.payments_by_tenancy(tenancy.id))
    })?;
    for payment in &pending {
        println!(
            "charge: {} ({}) due {}",
            payment.description,
            payment.amount,
            payment.due_date
        );
    }

    println!("\n== Settling move-in charges ==");
    let processed = engine.payments.process_payment(
        &principal,
        &ProcessPaymentRequest {
            tenant_id,
            pending_payment_ids: pending.iter().map(|payment| payment.id).collect(),
            settlement: SettlementDetails {
                payment_date: start_date + Duration::days(3),
                payment_method: "MPESA".to_string(),
                reference_number: "QDEMO001".to_string(),
            },
        },
    )?;
    println!("settled {} payments; the rent charge rolled over", processed.len());

    let stats = engine
        .dashboard
        .property_stats(&principal, built.property.id)?;
    println!("\n== Dashboard ==");
    println!(
        "occupancy: {}/{} units ({}%)",
        stats.occupied_units, stats.total_units, stats.occupancy_rate
    );
    println!(
        "payments: {} pending, {} completed, {} overdue",
        stats.pending_payments, stats.completed_payments, stats.overdue_payments
    );

    Ok(())
}
