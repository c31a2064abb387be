use rust_decimal::Decimal;
use sqlx::PgPool;

use pizzeria_models::{Item, Order, OrderCreate, OrderInfo, OrderStatus, Result};

/// Typed queries over the pizzeria schema. All statements are parameterized;
/// row shapes decode into the `FromRow` models.
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Denormalized order listing for one status, oldest first. Topping
    /// names are aggregated per order; `array_remove` drops the NULL that
    /// the left join produces for orders without toppings.
    pub async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<OrderInfo>> {
        let orders = sqlx::query_as::<_, OrderInfo>(
            r#"
            SELECT
                o.order_id,
                o.order_name,
                o.phone_number,
                o.price,
                o.status,
                o.created_at,
                o.updated_at,
                ps.name AS size_name,
                pss.name AS style_name,
                array_remove(array_agg(t.name), NULL) AS toppings
            FROM orders o
            INNER JOIN pizza_sizes ps ON o.size_id = ps.id
            INNER JOIN pizza_styles pss ON o.style_id = pss.id
            LEFT JOIN order_toppings ot ON o.order_id = ot.order_id
            LEFT JOIN toppings t ON ot.topping_id = t.id
            WHERE o.status = $1
            GROUP BY o.order_id, ps.name, pss.name, o.created_at
            ORDER BY o.created_at
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Insert an order and its topping junction rows in one transaction.
    /// Returns `None` when the insert produced no row.
    pub async fn insert_order(
        &self,
        order: &OrderCreate,
        price: Decimal,
    ) -> Result<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        let new_order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (order_name, phone_number, size_id, style_id, price)
            VALUES ($1, $2, $3, $4, $5) RETURNING *
            "#,
        )
        .bind(&order.order_name)
        .bind(&order.phone_number)
        .bind(order.size_id)
        .bind(order.style_id)
        .bind(price)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(new_order) = new_order else {
            tx.rollback().await?;
            return Ok(None);
        };

        for topping_id in &order.toppings {
            sqlx::query("INSERT INTO order_toppings (order_id, topping_id) VALUES ($1, $2)")
                .bind(new_order.order_id)
                .bind(topping_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(new_order))
    }

    /// Transition an order's status. Returns the number of rows touched so
    /// the caller can distinguish an unknown id.
    pub async fn update_order_status(&self, order_id: i32, status: OrderStatus) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = now() WHERE order_id = $1",
        )
        .bind(order_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Scalar price for a size/style/toppings combination. `None` when the
    /// size or style id does not exist.
    pub async fn order_price(
        &self,
        size_id: i32,
        style_id: i32,
        toppings: &[i32],
    ) -> Result<Option<Decimal>> {
        let price = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT
                pizza_sizes.price + pizza_styles.price + COALESCE(SUM(toppings.price), 0) AS price
            FROM
                pizza_sizes
            JOIN
                pizza_styles ON pizza_styles.id = $3
            LEFT JOIN
                toppings ON toppings.id = ANY($1::int[])
            WHERE
                pizza_sizes.id = $2
            GROUP BY
                pizza_sizes.price, pizza_styles.price
            "#,
        )
        .bind(toppings)
        .bind(size_id)
        .bind(style_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    pub async fn sizes(&self) -> Result<Vec<Item>> {
        let sizes = sqlx::query_as::<_, Item>("SELECT id, name, price FROM pizza_sizes")
            .fetch_all(&self.pool)
            .await?;
        Ok(sizes)
    }

    pub async fn styles(&self) -> Result<Vec<Item>> {
        let styles = sqlx::query_as::<_, Item>("SELECT id, name, price FROM pizza_styles")
            .fetch_all(&self.pool)
            .await?;
        Ok(styles)
    }

    pub async fn toppings(&self) -> Result<Vec<Item>> {
        let toppings =
            sqlx::query_as::<_, Item>("SELECT id, name, price FROM toppings ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(toppings)
    }
}
