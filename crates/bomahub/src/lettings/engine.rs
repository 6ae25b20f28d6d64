use std::sync::Arc;

use super::dashboard::Dashboard;
use super::payments::PaymentScheduler;
use super::store::LettingsStore;
use super::structure::PropertyStructureBuilder;
use super::tenancy::TenancyLifecycle;

/// Facade bundling the lifecycle services over one shared store, so the
/// router and CLI wire a single value.
pub struct LettingsEngine<S> {
    pub structure: PropertyStructureBuilder<S>,
    pub tenancy: TenancyLifecycle<S>,
    pub payments: PaymentScheduler<S>,
    pub dashboard: Dashboard<S>,
}

impl<S> LettingsEngine<S>
where
    S: LettingsStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            structure: PropertyStructureBuilder::new(store.clone()),
            tenancy: TenancyLifecycle::new(store.clone()),
            payments: PaymentScheduler::new(store.clone()),
            dashboard: Dashboard::new(store),
        }
    }
}
