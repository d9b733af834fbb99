use futures_util::future::{try_join, try_join_all};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use movequote_core::repository::EstimateRepository;
use movequote_core::{CoreError, CoreResult, DEFAULT_PRICE_PER_KM};
use movequote_shared::{CodeEnum, PackageType, UserOrder};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Price per whole kilometre between the two prefectures
    pub price_per_km: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_per_km: DEFAULT_PRICE_PER_KM,
        }
    }
}

/// Every figure that went into an estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub distance: f64,
    pub distance_km: i64,
    pub price_for_distance: i64,
    pub seasonal_coefficient: f64,
    pub total_boxes: i32,
    pub price_per_truck: i64,
    pub price_for_optional_service: i64,
    pub total: i64,
}

/// Estimates the price of a move:
/// `floor(N * (km * price_per_km + truck) + options)`.
pub struct PricingEngine {
    config: PricingConfig,
    repo: Arc<dyn EstimateRepository>,
}

fn overflow(what: &str) -> CoreError {
    CoreError::ValidationError(format!("{} is too large to price", what))
}

impl PricingEngine {
    pub fn new(config: PricingConfig, repo: Arc<dyn EstimateRepository>) -> Self {
        Self { config, repo }
    }

    pub async fn compute_price(&self, order: &UserOrder) -> CoreResult<i64> {
        Ok(self.quote(order).await?.total)
    }

    pub async fn quote(&self, order: &UserOrder) -> CoreResult<PriceBreakdown> {
        order.validate_for_pricing()?;

        // Distance and season do not depend on each other.
        let (distance, seasonal_coefficient) = try_join(
            self.repo
                .get_distance(&order.old_prefecture_id, &order.new_prefecture_id),
            self.repo.get_seasonal_coefficient(order.move_month_id),
        )
        .await?;

        if !distance.is_finite() {
            return Err(CoreError::InternalError(format!(
                "distance from {} to {} is not a number",
                order.old_prefecture_id, order.new_prefecture_id
            )));
        }
        if !seasonal_coefficient.is_finite() {
            return Err(CoreError::InternalError(format!(
                "seasonal coefficient for month {} is not a number",
                order.move_month_id
            )));
        }

        let distance_km = distance.floor() as i64;
        let price_for_distance = distance_km
            .checked_mul(self.config.price_per_km)
            .ok_or_else(|| overflow("distance"))?;

        let total_boxes = self.count_boxes(order).await?;
        let price_per_truck = i64::from(self.repo.get_price_per_truck(total_boxes).await?);

        let fees = try_join_all(
            order
                .options
                .selected()
                .map(|service| self.repo.get_price_per_optional_service(service)),
        )
        .await?;
        let price_for_optional_service = fees
            .into_iter()
            .try_fold(0i64, |sum, fee| sum.checked_add(i64::from(fee)))
            .ok_or_else(|| overflow("optional service total"))?;

        let base = price_for_distance
            .checked_add(price_per_truck)
            .ok_or_else(|| overflow("base price"))?;
        let raw = (seasonal_coefficient * base as f64 + price_for_optional_service as f64).floor();
        if !raw.is_finite() || raw < i64::MIN as f64 || raw >= i64::MAX as f64 {
            return Err(CoreError::InternalError(format!(
                "estimate {} is out of range",
                raw
            )));
        }
        let total = raw as i64;

        debug!(
            distance,
            distance_km,
            price_for_distance,
            seasonal_coefficient,
            total_boxes,
            price_per_truck,
            price_for_optional_service,
            "Estimate components"
        );
        info!(
            from = %order.old_prefecture_id,
            to = %order.new_prefecture_id,
            month = order.move_month_id,
            total,
            "Estimate computed"
        );

        Ok(PriceBreakdown {
            distance,
            distance_km,
            price_for_distance,
            seasonal_coefficient,
            total_boxes,
            price_per_truck,
            price_for_optional_service,
            total,
        })
    }

    /// Converts every item count to its equivalent number of boxes.
    async fn count_boxes(&self, order: &UserOrder) -> CoreResult<i32> {
        let factors = try_join_all(
            PackageType::ALL
                .iter()
                .map(|package| self.repo.get_box_per_package(*package)),
        )
        .await?;

        let mut total: i64 = 0;
        for (package, factor) in PackageType::ALL.iter().zip(factors) {
            let boxes = i64::from(order.packages.count_of(*package))
                .checked_mul(i64::from(factor))
                .ok_or_else(|| overflow("box count"))?;
            total = total
                .checked_add(boxes)
                .ok_or_else(|| overflow("box count"))?;
        }

        i32::try_from(total).map_err(|_| overflow("box count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movequote_shared::{Masked, OptionSelection, OptionalServiceType, PackageCounts};
    use movequote_store::InMemoryEstimateRepository;
    use proptest::prelude::*;

    fn order(month: i32, packages: PackageCounts, options: OptionSelection) -> UserOrder {
        UserOrder {
            customer_name: Masked::from("Hanako Yamada"),
            tel: Masked::from("090-1234-5678"),
            email: Masked::from("hanako@example.com"),
            old_prefecture_id: "13".to_string(),
            old_address: Masked::from("1-1 Chiyoda"),
            new_prefecture_id: "27".to_string(),
            new_address: Masked::from("2-2 Kita"),
            move_month_id: month,
            packages,
            options,
        }
    }

    /// 12.7 km, a single 5000 yen truck, nothing counts as a box.
    fn flat_repo() -> InMemoryEstimateRepository {
        InMemoryEstimateRepository::new()
            .with_distance("13", "27", 12.7)
            .with_coefficient(1, 1.0)
            .with_coefficient(4, 1.5)
            .with_box_per_package(PackageType::Box, 0)
            .with_box_per_package(PackageType::Bed, 0)
            .with_box_per_package(PackageType::Bicycle, 0)
            .with_box_per_package(PackageType::WashingMachine, 0)
            .with_truck(0, 5000)
            .with_option_fee(OptionalServiceType::WashingMachineInstall, 3000)
    }

    fn engine(repo: InMemoryEstimateRepository) -> PricingEngine {
        PricingEngine::new(PricingConfig::default(), Arc::new(repo))
    }

    #[tokio::test]
    async fn test_off_peak_without_options() {
        let engine = engine(flat_repo());
        let breakdown = engine
            .quote(&order(1, PackageCounts::default(), OptionSelection::default()))
            .await
            .unwrap();

        assert_eq!(breakdown.distance_km, 12);
        assert_eq!(breakdown.price_for_distance, 1200);
        assert_eq!(breakdown.price_per_truck, 5000);
        assert_eq!(breakdown.price_for_optional_service, 0);
        assert_eq!(breakdown.total, 6200);
    }

    #[tokio::test]
    async fn test_peak_month_with_washing_machine_install() {
        let engine = engine(flat_repo());
        let options = OptionSelection {
            washing_machine_installation: true,
            ..Default::default()
        };

        let price = engine
            .compute_price(&order(4, PackageCounts::default(), options))
            .await
            .unwrap();

        assert_eq!(price, 12300);
    }

    #[tokio::test]
    async fn test_empty_move_still_prices_a_truck() {
        let engine = engine(InMemoryEstimateRepository::seeded());
        let breakdown = engine
            .quote(&order(1, PackageCounts::default(), OptionSelection::default()))
            .await
            .unwrap();

        assert_eq!(breakdown.total_boxes, 0);
        assert_eq!(breakdown.price_per_truck, 30000);
        // 403 km * 100 + 30000
        assert_eq!(breakdown.total, 70300);
    }

    #[tokio::test]
    async fn test_items_are_converted_to_boxes() {
        let engine = engine(InMemoryEstimateRepository::seeded());
        let packages = PackageCounts {
            boxes: 10,
            bed: 1,
            bicycle: 2,
            washing_machine: 1,
        };

        let breakdown = engine
            .quote(&order(1, packages, OptionSelection::default()))
            .await
            .unwrap();
        // 10*1 + 1*15 + 2*5 + 1*10
        assert_eq!(breakdown.total_boxes, 45);
        assert_eq!(breakdown.price_per_truck, 30000);

        let packages = PackageCounts {
            boxes: 66,
            ..packages
        };
        let breakdown = engine
            .quote(&order(1, packages, OptionSelection::default()))
            .await
            .unwrap();
        assert_eq!(breakdown.total_boxes, 101);
        assert_eq!(breakdown.price_per_truck, 50000);
    }

    #[tokio::test]
    async fn test_every_selected_option_is_charged() {
        let engine = engine(InMemoryEstimateRepository::seeded());
        let options = OptionSelection {
            washing_machine_installation: true,
            box_collect: true,
            new_life_set: true,
            furniture_setting: true,
            public_fee: true,
        };

        let breakdown = engine
            .quote(&order(9, PackageCounts::default(), options))
            .await
            .unwrap();

        assert_eq!(breakdown.price_for_optional_service, 3000 + 2000 + 5000 + 4000 + 1000);
        assert_eq!(breakdown.seasonal_coefficient, 1.2);
    }

    #[tokio::test]
    async fn test_each_flag_charges_its_own_fee() {
        let fees = [
            (OptionalServiceType::WashingMachineInstall, 3100),
            (OptionalServiceType::BoxCollect, 3200),
            (OptionalServiceType::NewLifeSet, 3300),
            (OptionalServiceType::FurnitureSetting, 3400),
            (OptionalServiceType::PublicFee, 3500),
        ];
        let repo = fees
            .iter()
            .fold(flat_repo(), |repo, (service, fee)| repo.with_option_fee(*service, *fee));
        let engine = engine(repo);

        for (service, fee) in fees {
            let mut options = OptionSelection::default();
            match service {
                OptionalServiceType::WashingMachineInstall => options.washing_machine_installation = true,
                OptionalServiceType::BoxCollect => options.box_collect = true,
                OptionalServiceType::NewLifeSet => options.new_life_set = true,
                OptionalServiceType::FurnitureSetting => options.furniture_setting = true,
                OptionalServiceType::PublicFee => options.public_fee = true,
            }

            let breakdown = engine
                .quote(&order(1, PackageCounts::default(), options))
                .await
                .unwrap();

            assert_eq!(breakdown.price_for_optional_service, i64::from(fee), "{:?}", service);
            assert_eq!(breakdown.total, 6200 + i64::from(fee), "{:?}", service);
        }
    }

    #[tokio::test]
    async fn test_contact_format_does_not_affect_price() {
        let engine = engine(flat_repo());

        for tel in ["090 1234 5678", "(03) 1234-5678"] {
            let mut request = order(1, PackageCounts::default(), OptionSelection::default());
            request.tel = Masked::from(tel);
            assert_eq!(engine.compute_price(&request).await.unwrap(), 6200, "{}", tel);
        }

        let mut request = order(1, PackageCounts::default(), OptionSelection::default());
        request.customer_name = Masked::from("");
        request.tel = Masked::from("");
        request.email = Masked::from("");
        request.old_address = Masked::from("");
        request.new_address = Masked::from("");
        assert_eq!(engine.compute_price(&request).await.unwrap(), 6200);
    }

    #[tokio::test]
    async fn test_missing_lookups_propagate() {
        let no_distance = InMemoryEstimateRepository::new()
            .with_coefficient(1, 1.0)
            .with_truck(0, 5000);
        let err = engine(no_distance)
            .compute_price(&order(1, PackageCounts::default(), OptionSelection::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        let err = engine(flat_repo())
            .compute_price(&order(2, PackageCounts::default(), OptionSelection::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(msg) if msg.contains("month 2")));

        let options = OptionSelection {
            public_fee: true,
            ..Default::default()
        };
        let err = engine(flat_repo())
            .compute_price(&order(1, PackageCounts::default(), options))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(msg) if msg.contains("optional service 5")));
    }

    #[tokio::test]
    async fn test_no_truck_large_enough() {
        let repo = InMemoryEstimateRepository::seeded();
        let packages = PackageCounts {
            boxes: 201,
            ..Default::default()
        };

        let err = engine(repo)
            .compute_price(&order(1, packages, OptionSelection::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(msg) if msg.contains("201")));
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_lookup() {
        let err = engine(InMemoryEstimateRepository::new())
            .compute_price(&order(0, PackageCounts::default(), OptionSelection::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_non_finite_coefficient_is_rejected() {
        let repo = flat_repo().with_coefficient(1, f64::NAN);
        let err = engine(repo)
            .compute_price(&order(1, PackageCounts::default(), OptionSelection::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InternalError(_)));
    }

    #[test]
    fn test_breakdown_serialization() {
        let breakdown = PriceBreakdown {
            distance: 12.7,
            distance_km: 12,
            price_for_distance: 1200,
            seasonal_coefficient: 1.0,
            total_boxes: 0,
            price_per_truck: 5000,
            price_for_optional_service: 0,
            total: 6200,
        };
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["total"], 6200);
        assert_eq!(json["distance_km"], 12);
    }

    proptest! {
        #[test]
        fn prop_price_is_deterministic_and_non_negative(
            km in 0.0f64..2000.0,
            coefficient in 0.0f64..3.0,
            box_factor in 0i32..20,
            truck in 0i32..100_000,
            fee in 0i32..10_000,
            boxes in 0u32..500,
            install in any::<bool>(),
        ) {
            let repo = InMemoryEstimateRepository::new()
                .with_distance("13", "27", km)
                .with_coefficient(1, coefficient)
                .with_box_per_package(PackageType::Box, box_factor)
                .with_box_per_package(PackageType::Bed, box_factor)
                .with_box_per_package(PackageType::Bicycle, box_factor)
                .with_box_per_package(PackageType::WashingMachine, box_factor)
                .with_truck(i32::MAX, truck)
                .with_option_fee(OptionalServiceType::WashingMachineInstall, fee);
            let engine = engine(repo);
            let request = order(
                1,
                PackageCounts { boxes, ..Default::default() },
                OptionSelection { washing_machine_installation: install, ..Default::default() },
            );

            let rt = tokio::runtime::Runtime::new().unwrap();
            let first = rt.block_on(engine.compute_price(&request)).unwrap();
            let second = rt.block_on(engine.compute_price(&request)).unwrap();

            prop_assert_eq!(first, second);
            prop_assert!(first >= 0);
            if install {
                prop_assert!(first >= i64::from(fee));
            }
        }
    }
}
