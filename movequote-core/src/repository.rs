use async_trait::async_trait;
use movequote_shared::{
    Customer, CustomerId, CustomerOptionService, CustomerPackage, OptionalServiceType, PackageType,
    Prefecture,
};

use crate::CoreResult;

/// Reference-data lookups and order persistence behind the quote engine.
///
/// Every lookup that has no matching row returns `CoreError::NotFound`;
/// implementations never substitute a default value.
#[async_trait]
pub trait EstimateRepository: Send + Sync {
    /// Distance in kilometres from one prefecture to another
    async fn get_distance(
        &self,
        old_prefecture_id: &str,
        new_prefecture_id: &str,
    ) -> CoreResult<f64>;

    /// Seasonal price multiplier for the month of the move
    async fn get_seasonal_coefficient(&self, month_id: i32) -> CoreResult<f64>;

    /// How many boxes one item of the given type counts as
    async fn get_box_per_package(&self, package: PackageType) -> CoreResult<i32>;

    /// Price of the cheapest truck that holds `box_count` boxes
    async fn get_price_per_truck(&self, box_count: i32) -> CoreResult<i32>;

    async fn get_price_per_optional_service(
        &self,
        service: OptionalServiceType,
    ) -> CoreResult<i32>;

    async fn list_prefectures(&self) -> CoreResult<Vec<Prefecture>>;

    /// Opens a transaction for registering one order.
    async fn begin(&self) -> CoreResult<Box<dyn OrderTransaction>>;
}

/// Write side of a single order registration.
///
/// Nothing written through the transaction is visible until `commit`.
/// Dropping it without committing discards every write.
#[async_trait]
pub trait OrderTransaction: Send {
    async fn insert_customer(&mut self, customer: &Customer) -> CoreResult<CustomerId>;

    async fn insert_customer_option_service(
        &mut self,
        row: &CustomerOptionService,
    ) -> CoreResult<()>;

    async fn batch_insert_customer_packages(&mut self, rows: &[CustomerPackage]) -> CoreResult<()>;

    async fn commit(self: Box<Self>) -> CoreResult<()>;

    async fn rollback(self: Box<Self>) -> CoreResult<()>;
}
