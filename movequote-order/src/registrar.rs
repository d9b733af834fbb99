use std::sync::Arc;
use tracing::{info, warn};

use movequote_core::repository::{EstimateRepository, OrderTransaction};
use movequote_core::{CoreError, CoreResult};
use movequote_shared::{
    CodeEnum, Customer, CustomerId, CustomerOptionService, CustomerPackage, PackageType, UserOrder,
};

/// Records a quote request: the customer, the chosen option services and
/// one package row per package type, all in a single transaction.
pub struct OrderRegistrar {
    repo: Arc<dyn EstimateRepository>,
}

impl OrderRegistrar {
    pub fn new(repo: Arc<dyn EstimateRepository>) -> Self {
        Self { repo }
    }

    /// Persists the order and returns the generated customer id.
    ///
    /// On any failure the transaction is rolled back and the original error
    /// is returned.
    pub async fn register_order(&self, order: &UserOrder) -> CoreResult<CustomerId> {
        order.validate()?;

        let mut tx = self.repo.begin().await?;
        match write_order(tx.as_mut(), order).await {
            Ok(customer_id) => {
                tx.commit().await?;
                info!(
                    %customer_id,
                    option_services = order.options.selected().count(),
                    "Order registered"
                );
                Ok(customer_id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed registration also failed");
                }
                Err(err)
            }
        }
    }
}

async fn write_order(tx: &mut dyn OrderTransaction, order: &UserOrder) -> CoreResult<CustomerId> {
    let customer_id = tx.insert_customer(&Customer::from(order)).await?;

    for service in order.options.selected() {
        tx.insert_customer_option_service(&CustomerOptionService {
            customer_id,
            service,
        })
        .await?;
    }

    let packages = package_rows(customer_id, order)?;
    tx.batch_insert_customer_packages(&packages).await?;

    Ok(customer_id)
}

/// Exactly one row per package type, zero counts included.
fn package_rows(customer_id: CustomerId, order: &UserOrder) -> CoreResult<Vec<CustomerPackage>> {
    PackageType::ALL
        .iter()
        .map(|package| {
            let count = order.packages.count_of(*package);
            let package_number = i32::try_from(count).map_err(|_| {
                CoreError::ValidationError(format!(
                    "{} count {} is out of range",
                    package.label(),
                    count
                ))
            })?;
            Ok(CustomerPackage {
                customer_id,
                package: *package,
                package_number,
            })
        })
        .collect()
}
