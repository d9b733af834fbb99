use std::sync::Arc;
use movequote_core::repository::EstimateRepository;
use movequote_order::OrderRegistrar;
use movequote_pricing::{PricingConfig, PricingEngine};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn EstimateRepository>,
    pub pricing: Arc<PricingEngine>,
    pub registrar: Arc<OrderRegistrar>,
}

impl AppState {
    pub fn new(repo: Arc<dyn EstimateRepository>, pricing: PricingConfig) -> Self {
        Self {
            pricing: Arc::new(PricingEngine::new(pricing, repo.clone())),
            registrar: Arc::new(OrderRegistrar::new(repo.clone())),
            repo,
        }
    }
}
