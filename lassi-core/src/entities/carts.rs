use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use lassi_sdk::objects::{CartDetail, CartEntry};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct CartLine {
    pub fid: i32,
    pub quantity: i32,
}

impl From<CartLine> for CartEntry {
    fn from(line: CartLine) -> Self {
        CartEntry {
            fid: line.fid,
            quantity: line.quantity,
        }
    }
}

impl CartLine {
    /// Empty a user's cart inside an order placement transaction.
    pub async fn clear_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}

/// A cart line joined with its menu entry.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CartDetailRow {
    pub fid: i32,
    pub fname: String,
    pub cost: Decimal,
    pub veg: bool,
    pub quantity: i32,
}

impl From<CartDetailRow> for CartDetail {
    fn from(row: CartDetailRow) -> Self {
        CartDetail {
            fid: row.fid,
            fname: row.fname,
            cost: row.cost,
            veg: row.veg,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetCart {
    pub user_id: Uuid,
}

impl Processor<GetCart> for DatabaseProcessor {
    type Output = Vec<CartLine>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetCart")]
    async fn process(&self, query: GetCart) -> Result<Vec<CartLine>, sqlx::Error> {
        sqlx::query_as::<_, CartLine>(
            "SELECT fid, quantity FROM cart_items WHERE user_id = $1 ORDER BY added_at, fid",
        )
        .bind(query.user_id)
        .fetch_all(&self.pool)
        .await
    }
}

/// Set the absolute quantity of a cart line, creating it if needed.
#[derive(Debug, Clone, Copy)]
pub struct SetCartQuantity {
    pub user_id: Uuid,
    pub fid: i32,
    pub quantity: i32,
}

impl Processor<SetCartQuantity> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SetCartQuantity")]
    async fn process(&self, update: SetCartQuantity) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO cart_items (user_id, fid, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, fid) DO UPDATE SET quantity = EXCLUDED.quantity",
        )
        .bind(update.user_id)
        .bind(update.fid)
        .bind(update.quantity)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RemoveCartLine {
    pub user_id: Uuid,
    pub fid: i32,
}

impl Processor<RemoveCartLine> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:RemoveCartLine")]
    async fn process(&self, delete: RemoveCartLine) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND fid = $2")
            .bind(delete.user_id)
            .bind(delete.fid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetCartDetails {
    pub user_id: Uuid,
}

impl Processor<GetCartDetails> for DatabaseProcessor {
    type Output = Vec<CartDetailRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetCartDetails")]
    async fn process(&self, query: GetCartDetails) -> Result<Vec<CartDetailRow>, sqlx::Error> {
        sqlx::query_as::<_, CartDetailRow>(
            "SELECT c.fid, f.fname, f.cost, f.veg, c.quantity \
             FROM cart_items c \
             JOIN food_items f ON f.fid = c.fid \
             WHERE c.user_id = $1 \
             ORDER BY c.added_at, c.fid",
        )
        .bind(query.user_id)
        .fetch_all(&self.pool)
        .await
    }
}
