use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use lassi_sdk::objects::FoodItem;
use rust_decimal::Decimal;

/// A row of `food_items` joined with its category name.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FoodItemRecord {
    pub fid: i32,
    pub fname: String,
    pub category: i32,
    pub catname: Option<String>,
    pub cost: Decimal,
    pub sgst: Decimal,
    pub cgst: Decimal,
    pub tax: Decimal,
    pub active: bool,
    pub is_on: bool,
    pub veg: bool,
    pub depend_inv: Vec<String>,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

impl FoodItemRecord {
    /// Whether the item can be put in a cart.
    pub fn is_orderable(&self) -> bool {
        self.active && self.is_on
    }
}

impl From<FoodItemRecord> for FoodItem {
    fn from(record: FoodItemRecord) -> Self {
        FoodItem {
            fid: record.fid,
            fname: record.fname,
            category: record.category,
            catname: record.catname,
            cost: record.cost,
            sgst: record.sgst,
            cgst: record.cgst,
            tax: record.tax,
            active: record.active,
            is_on: record.is_on,
            veg: record.veg,
            depend_inv: record.depend_inv,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

const FOOD_ITEM_SELECT: &str = "SELECT f.fid, f.fname, f.category, c.catname, \
        f.cost, f.sgst, f.cgst, f.tax, f.active, f.is_on, f.veg, f.depend_inv, \
        f.created_at, f.updated_at \
    FROM food_items f \
    LEFT JOIN categories c ON c.catid = f.category";

/// Every menu item with its category name, ordered by category then id.
#[derive(Debug, Clone, Copy)]
pub struct ListFoodItems;

impl Processor<ListFoodItems> for DatabaseProcessor {
    type Output = Vec<FoodItemRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListFoodItems")]
    async fn process(&self, _query: ListFoodItems) -> Result<Vec<FoodItemRecord>, sqlx::Error> {
        sqlx::query_as::<_, FoodItemRecord>(&format!(
            "{FOOD_ITEM_SELECT} ORDER BY f.category, f.fid"
        ))
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetFoodItem {
    pub fid: i32,
}

impl Processor<GetFoodItem> for DatabaseProcessor {
    type Output = Option<FoodItemRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetFoodItem")]
    async fn process(&self, query: GetFoodItem) -> Result<Option<FoodItemRecord>, sqlx::Error> {
        sqlx::query_as::<_, FoodItemRecord>(&format!("{FOOD_ITEM_SELECT} WHERE f.fid = $1"))
            .bind(query.fid)
            .fetch_optional(&self.pool)
            .await
    }
}
