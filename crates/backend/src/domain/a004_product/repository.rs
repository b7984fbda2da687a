use contracts::domain::a001_location::LocationId;
use contracts::domain::a002_category::CategoryId;
use contracts::domain::a003_supplier::SupplierId;
use contracts::domain::a004_product::{Product, ProductId, ProductPrices};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

/// SQLite ограничивает число параметров запроса, коды запрашиваем пачками
const CODES_CHUNK_SIZE: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_code: String,
    pub name: String,
    pub description: String,
    pub stock: i64,
    pub purchase_price: i64,
    pub retail_price: i64,
    pub silver_price: i64,
    pub gold_price: i64,
    pub platinum_price: i64,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub location_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Product {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let category_id = m
            .category_id
            .as_deref()
            .map(CategoryId::from_string)
            .transpose()
            .map_err(DbErr::Custom)?;
        let supplier_id = m
            .supplier_id
            .as_deref()
            .map(SupplierId::from_string)
            .transpose()
            .map_err(DbErr::Custom)?;

        Ok(Product {
            id: ProductId::from_string(&m.id).map_err(DbErr::Custom)?,
            product_code: m.product_code,
            name: m.name,
            description: m.description,
            stock: m.stock,
            prices: ProductPrices {
                purchase: m.purchase_price,
                retail: m.retail_price,
                silver: m.silver_price,
                gold: m.gold_price,
                platinum: m.platinum_price,
            },
            category_id,
            supplier_id,
            location_id: LocationId::from_string(&m.location_id).map_err(DbErr::Custom)?,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

/// Поля карточки, которые перезаписываются при повторном импорте
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOverwrite {
    pub name: String,
    pub description: String,
    pub prices: ProductPrices,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
}

pub async fn find_by_code<C: ConnectionTrait>(
    conn: &C,
    product_code: &str,
) -> Result<Option<Product>, DbErr> {
    Entity::find()
        .filter(Column::ProductCode.eq(product_code))
        .one(conn)
        .await?
        .map(Product::try_from)
        .transpose()
}

/// Все товары с кодами из списка (порядок результата не определён)
pub async fn find_by_codes<C: ConnectionTrait>(
    conn: &C,
    codes: &[String],
) -> Result<Vec<Product>, DbErr> {
    let mut found = Vec::new();
    for chunk in codes.chunks(CODES_CHUNK_SIZE) {
        let models = Entity::find()
            .filter(Column::ProductCode.is_in(chunk.iter().cloned()))
            .all(conn)
            .await?;
        for m in models {
            found.push(Product::try_from(m)?);
        }
    }
    Ok(found)
}

pub async fn insert<C: ConnectionTrait>(conn: &C, product: &Product) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(product.id.as_string()),
        product_code: Set(product.product_code.clone()),
        name: Set(product.name.clone()),
        description: Set(product.description.clone()),
        stock: Set(product.stock),
        purchase_price: Set(product.prices.purchase),
        retail_price: Set(product.prices.retail),
        silver_price: Set(product.prices.silver),
        gold_price: Set(product.prices.gold),
        platinum_price: Set(product.prices.platinum),
        category_id: Set(product.category_id.map(|id| id.as_string())),
        supplier_id: Set(product.supplier_id.map(|id| id.as_string())),
        location_id: Set(product.location_id.as_string()),
        created_at: Set(product.metadata.created_at),
        updated_at: Set(product.metadata.updated_at),
    };
    Entity::insert(active).exec_without_returning(conn).await?;
    Ok(())
}

/// Перезаписать поля карточки и прибавить `add_stock` к остатку
///
/// Остаток меняется выражением `stock = stock + n` в том же UPDATE,
/// чтобы параллельные импорты не теряли приращения.
pub async fn overwrite<C: ConnectionTrait>(
    conn: &C,
    id: ProductId,
    fields: &ProductOverwrite,
    add_stock: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::Name, Expr::value(fields.name.clone()))
        .col_expr(Column::Description, Expr::value(fields.description.clone()))
        .col_expr(Column::PurchasePrice, Expr::value(fields.prices.purchase))
        .col_expr(Column::RetailPrice, Expr::value(fields.prices.retail))
        .col_expr(Column::SilverPrice, Expr::value(fields.prices.silver))
        .col_expr(Column::GoldPrice, Expr::value(fields.prices.gold))
        .col_expr(Column::PlatinumPrice, Expr::value(fields.prices.platinum))
        .col_expr(
            Column::CategoryId,
            Expr::value(fields.category_id.map(|id| id.as_string())),
        )
        .col_expr(
            Column::SupplierId,
            Expr::value(fields.supplier_id.map(|id| id.as_string())),
        )
        .col_expr(Column::Stock, Expr::col(Column::Stock).add(add_stock))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id.as_string()))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DbErr::RecordNotFound(format!("product {}", id.as_string())));
    }
    Ok(())
}

/// Прибавить остаток, не трогая остальные поля карточки
pub async fn increment_stock<C: ConnectionTrait>(
    conn: &C,
    id: ProductId,
    add_stock: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::Stock, Expr::col(Column::Stock).add(add_stock))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id.as_string()))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DbErr::RecordNotFound(format!("product {}", id.as_string())));
    }
    Ok(())
}
