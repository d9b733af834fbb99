use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use movequote_core::repository::{EstimateRepository, OrderTransaction};
use movequote_core::{CoreError, CoreResult};
use movequote_shared::{
    Customer, CustomerId, CustomerOptionService, CustomerPackage, OptionalServiceType, PackageType,
    Prefecture, CodeEnum,
};

pub struct StoreEstimateRepository {
    pool: PgPool,
}

impl StoreEstimateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PrefectureRow {
    prefecture_id: String,
    prefecture_name: String,
}

fn persistence(err: sqlx::Error) -> CoreError {
    CoreError::Persistence(err.to_string())
}

#[async_trait]
impl EstimateRepository for StoreEstimateRepository {
    async fn get_distance(
        &self,
        old_prefecture_id: &str,
        new_prefecture_id: &str,
    ) -> CoreResult<f64> {
        let distance: Option<f64> = sqlx::query_scalar(
            "SELECT distance FROM prefecture_distance WHERE from_prefecture_id = $1 AND to_prefecture_id = $2",
        )
        .bind(old_prefecture_id)
        .bind(new_prefecture_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        distance.ok_or_else(|| {
            CoreError::NotFound(format!(
                "distance from prefecture {} to {}",
                old_prefecture_id, new_prefecture_id
            ))
        })
    }

    async fn get_seasonal_coefficient(&self, month_id: i32) -> CoreResult<f64> {
        let coefficient: Option<f64> =
            sqlx::query_scalar("SELECT coefficient FROM season_coefficient WHERE month_id = $1")
                .bind(month_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(persistence)?;

        coefficient
            .ok_or_else(|| CoreError::NotFound(format!("seasonal coefficient for month {}", month_id)))
    }

    async fn get_box_per_package(&self, package: PackageType) -> CoreResult<i32> {
        let boxes: Option<i32> =
            sqlx::query_scalar("SELECT box_count FROM package_content WHERE package_id = $1")
                .bind(package.code())
                .fetch_optional(&self.pool)
                .await
                .map_err(persistence)?;

        boxes.ok_or_else(|| CoreError::NotFound(format!("box count for package {}", package.code())))
    }

    async fn get_price_per_truck(&self, box_count: i32) -> CoreResult<i32> {
        let price: Option<i32> = sqlx::query_scalar(
            "SELECT price FROM truck_capacity WHERE max_box >= $1 ORDER BY price LIMIT 1",
        )
        .bind(box_count)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        price.ok_or_else(|| CoreError::NotFound(format!("truck for {} boxes", box_count)))
    }

    async fn get_price_per_optional_service(
        &self,
        service: OptionalServiceType,
    ) -> CoreResult<i32> {
        let price: Option<i32> =
            sqlx::query_scalar("SELECT price FROM optional_service WHERE service_id = $1")
                .bind(service.code())
                .fetch_optional(&self.pool)
                .await
                .map_err(persistence)?;

        price.ok_or_else(|| {
            CoreError::NotFound(format!("price for optional service {}", service.code()))
        })
    }

    async fn list_prefectures(&self) -> CoreResult<Vec<Prefecture>> {
        let rows: Vec<PrefectureRow> = sqlx::query_as(
            "SELECT prefecture_id, prefecture_name FROM prefecture ORDER BY prefecture_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows
            .into_iter()
            .map(|row| Prefecture {
                id: row.prefecture_id,
                name: row.prefecture_name,
            })
            .collect())
    }

    async fn begin(&self) -> CoreResult<Box<dyn OrderTransaction>> {
        let tx = self.pool.begin().await.map_err(persistence)?;
        Ok(Box::new(StoreOrderTransaction { tx }))
    }
}

/// Wraps a pooled transaction; sqlx rolls it back if it is dropped uncommitted.
struct StoreOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for StoreOrderTransaction {
    async fn insert_customer(&mut self, customer: &Customer) -> CoreResult<CustomerId> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO customer (customer_name, tel, email, old_prefecture_id, old_address, new_prefecture_id, new_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING customer_id
            "#,
        )
        .bind(customer.customer_name.expose())
        .bind(customer.tel.expose())
        .bind(customer.email.expose())
        .bind(&customer.old_prefecture_id)
        .bind(customer.old_address.expose())
        .bind(&customer.new_prefecture_id)
        .bind(customer.new_address.expose())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(persistence)?;

        Ok(CustomerId(id))
    }

    async fn insert_customer_option_service(
        &mut self,
        row: &CustomerOptionService,
    ) -> CoreResult<()> {
        sqlx::query("INSERT INTO customer_option_service (customer_id, service_id) VALUES ($1, $2)")
            .bind(row.customer_id.0)
            .bind(row.service_code())
            .execute(&mut *self.tx)
            .await
            .map_err(persistence)?;
        Ok(())
    }

    async fn batch_insert_customer_packages(&mut self, rows: &[CustomerPackage]) -> CoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO customer_package (customer_id, package_id, package_number) ",
        );
        builder.push_values(rows, |mut b, row| {
            b.push_bind(row.customer_id.0)
                .push_bind(row.package_code())
                .push_bind(row.package_number);
        });

        builder
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(persistence)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let this = *self;
        this.tx.commit().await.map_err(persistence)
    }

    async fn rollback(self: Box<Self>) -> CoreResult<()> {
        let this = *self;
        this.tx.rollback().await.map_err(persistence)
    }
}
