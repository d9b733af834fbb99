use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use movequote_core::repository::{EstimateRepository, OrderTransaction};
use movequote_core::{CoreError, CoreResult};
use movequote_shared::{
    CodeEnum, Customer, CustomerId, CustomerOptionService, CustomerPackage, OptionalServiceType,
    PackageType, Prefecture,
};

/// Write step at which an in-memory transaction can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertCustomer,
    InsertOptionService,
    InsertPackages,
    Commit,
}

#[derive(Debug, Default, Clone)]
struct ReferenceData {
    prefectures: Vec<Prefecture>,
    distances: HashMap<(String, String), f64>,
    coefficients: HashMap<i32, f64>,
    box_per_package: HashMap<i32, i32>,
    // (max_box, price)
    trucks: Vec<(i32, i32)>,
    option_fees: HashMap<i32, i32>,
}

#[derive(Debug, Default, Clone)]
struct Tables {
    customers: Vec<(CustomerId, Customer)>,
    option_services: Vec<CustomerOptionService>,
    packages: Vec<CustomerPackage>,
}

/// Process-local store with the same lookup and transaction semantics as
/// the PostgreSQL repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEstimateRepository {
    reference: ReferenceData,
    tables: Arc<Mutex<Tables>>,
    // Like a database sequence, ids are not reused after a rollback.
    next_customer_id: Arc<AtomicI32>,
    fail_at: Option<FailPoint>,
}

impl InMemoryEstimateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference data matching the rows seeded by the initial migration.
    pub fn seeded() -> Self {
        let mut repo = Self::new()
            .with_prefecture("01", "Hokkaido")
            .with_prefecture("13", "Tokyo")
            .with_prefecture("14", "Kanagawa")
            .with_prefecture("27", "Osaka")
            .with_prefecture("40", "Fukuoka");

        let distances = [
            ("01", "13", 831.4),
            ("01", "14", 856.9),
            ("01", "27", 1056.3),
            ("01", "40", 1421.7),
            ("13", "14", 27.8),
            ("13", "27", 403.2),
            ("13", "40", 883.5),
            ("14", "27", 377.6),
            ("14", "40", 858.9),
            ("27", "40", 481.1),
        ];
        for (from, to, km) in distances {
            repo = repo.with_distance(from, to, km).with_distance(to, from, km);
        }
        for id in ["01", "13", "14", "27", "40"] {
            repo = repo.with_distance(id, id, 0.0);
        }

        for month in 1..=12 {
            let n = match month {
                3 | 4 => 1.5,
                9 => 1.2,
                _ => 1.0,
            };
            repo = repo.with_coefficient(month, n);
        }

        repo.with_box_per_package(PackageType::Box, 1)
            .with_box_per_package(PackageType::Bed, 15)
            .with_box_per_package(PackageType::Bicycle, 5)
            .with_box_per_package(PackageType::WashingMachine, 10)
            .with_truck(80, 30000)
            .with_truck(200, 50000)
            .with_option_fee(OptionalServiceType::WashingMachineInstall, 3000)
            .with_option_fee(OptionalServiceType::BoxCollect, 2000)
            .with_option_fee(OptionalServiceType::NewLifeSet, 5000)
            .with_option_fee(OptionalServiceType::FurnitureSetting, 4000)
            .with_option_fee(OptionalServiceType::PublicFee, 1000)
    }

    pub fn with_prefecture(mut self, id: &str, name: &str) -> Self {
        self.reference.prefectures.push(Prefecture {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_distance(mut self, from: &str, to: &str, km: f64) -> Self {
        self.reference
            .distances
            .insert((from.to_string(), to.to_string()), km);
        self
    }

    pub fn with_coefficient(mut self, month_id: i32, coefficient: f64) -> Self {
        self.reference.coefficients.insert(month_id, coefficient);
        self
    }

    pub fn with_box_per_package(mut self, package: PackageType, boxes: i32) -> Self {
        self.reference.box_per_package.insert(package.code(), boxes);
        self
    }

    pub fn with_truck(mut self, max_box: i32, price: i32) -> Self {
        self.reference.trucks.push((max_box, price));
        self
    }

    pub fn with_option_fee(mut self, service: OptionalServiceType, price: i32) -> Self {
        self.reference.option_fees.insert(service.code(), price);
        self
    }

    pub fn failing_at(mut self, point: FailPoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    pub fn customers(&self) -> Vec<(CustomerId, Customer)> {
        self.lock_tables().customers.clone()
    }

    pub fn option_services(&self) -> Vec<CustomerOptionService> {
        self.lock_tables().option_services.clone()
    }

    pub fn packages(&self) -> Vec<CustomerPackage> {
        self.lock_tables().packages.clone()
    }

    fn lock_tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EstimateRepository for InMemoryEstimateRepository {
    async fn get_distance(
        &self,
        old_prefecture_id: &str,
        new_prefecture_id: &str,
    ) -> CoreResult<f64> {
        self.reference
            .distances
            .get(&(old_prefecture_id.to_string(), new_prefecture_id.to_string()))
            .copied()
            .ok_or_else(|| {
                CoreError::NotFound(format!(
                    "distance from prefecture {} to {}",
                    old_prefecture_id, new_prefecture_id
                ))
            })
    }

    async fn get_seasonal_coefficient(&self, month_id: i32) -> CoreResult<f64> {
        self.reference
            .coefficients
            .get(&month_id)
            .copied()
            .ok_or_else(|| CoreError::NotFound(format!("seasonal coefficient for month {}", month_id)))
    }

    async fn get_box_per_package(&self, package: PackageType) -> CoreResult<i32> {
        self.reference
            .box_per_package
            .get(&package.code())
            .copied()
            .ok_or_else(|| CoreError::NotFound(format!("box count for package {}", package.code())))
    }

    async fn get_price_per_truck(&self, box_count: i32) -> CoreResult<i32> {
        self.reference
            .trucks
            .iter()
            .filter(|(max_box, _)| *max_box >= box_count)
            .map(|(_, price)| *price)
            .min()
            .ok_or_else(|| CoreError::NotFound(format!("truck for {} boxes", box_count)))
    }

    async fn get_price_per_optional_service(
        &self,
        service: OptionalServiceType,
    ) -> CoreResult<i32> {
        self.reference
            .option_fees
            .get(&service.code())
            .copied()
            .ok_or_else(|| CoreError::NotFound(format!("price for optional service {}", service.code())))
    }

    async fn list_prefectures(&self) -> CoreResult<Vec<Prefecture>> {
        let mut prefectures = self.reference.prefectures.clone();
        prefectures.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(prefectures)
    }

    async fn begin(&self) -> CoreResult<Box<dyn OrderTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            tables: Arc::clone(&self.tables),
            next_customer_id: Arc::clone(&self.next_customer_id),
            fail_at: self.fail_at,
            pending: Tables::default(),
        }))
    }
}

struct InMemoryTransaction {
    tables: Arc<Mutex<Tables>>,
    next_customer_id: Arc<AtomicI32>,
    fail_at: Option<FailPoint>,
    pending: Tables,
}

impl InMemoryTransaction {
    fn check(&self, point: FailPoint) -> CoreResult<()> {
        if self.fail_at == Some(point) {
            return Err(CoreError::Persistence(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }

    fn check_customer(&self, customer_id: CustomerId) -> CoreResult<()> {
        if self.pending.customers.iter().any(|(id, _)| *id == customer_id) {
            Ok(())
        } else {
            Err(CoreError::Persistence(format!(
                "customer {} does not exist",
                customer_id
            )))
        }
    }
}

#[async_trait]
impl OrderTransaction for InMemoryTransaction {
    async fn insert_customer(&mut self, customer: &Customer) -> CoreResult<CustomerId> {
        self.check(FailPoint::InsertCustomer)?;
        let id = CustomerId(self.next_customer_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.pending.customers.push((id, customer.clone()));
        Ok(id)
    }

    async fn insert_customer_option_service(
        &mut self,
        row: &CustomerOptionService,
    ) -> CoreResult<()> {
        self.check(FailPoint::InsertOptionService)?;
        self.check_customer(row.customer_id)?;
        let duplicate = self
            .pending
            .option_services
            .iter()
            .any(|r| r.customer_id == row.customer_id && r.service == row.service);
        if duplicate {
            return Err(CoreError::Persistence(format!(
                "duplicate option service {} for customer {}",
                row.service_code(),
                row.customer_id
            )));
        }
        self.pending.option_services.push(*row);
        Ok(())
    }

    async fn batch_insert_customer_packages(&mut self, rows: &[CustomerPackage]) -> CoreResult<()> {
        self.check(FailPoint::InsertPackages)?;
        for row in rows {
            self.check_customer(row.customer_id)?;
        }
        self.pending.packages.extend_from_slice(rows);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        self.check(FailPoint::Commit)?;
        let InMemoryTransaction { tables, pending, .. } = *self;
        let mut tables = tables
            .lock()
            .map_err(|_| CoreError::Persistence("store lock poisoned".to_string()))?;
        tables.customers.extend(pending.customers);
        tables.option_services.extend(pending.option_services);
        tables.packages.extend(pending.packages);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> CoreResult<()> {
        Ok(())
    }
}
