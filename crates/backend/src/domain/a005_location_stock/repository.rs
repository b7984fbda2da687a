use contracts::domain::a001_location::LocationId;
use contracts::domain::a004_product::ProductId;
use contracts::domain::a005_location_stock::LocationStock;
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_location_stock")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub location_id: String,
    pub quantity: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LocationStock {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(LocationStock {
            id: m.id,
            product_id: ProductId::from_string(&m.product_id).map_err(DbErr::Custom)?,
            location_id: LocationId::from_string(&m.location_id).map_err(DbErr::Custom)?,
            quantity: m.quantity,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

pub async fn find<C: ConnectionTrait>(
    conn: &C,
    product_id: ProductId,
    location_id: LocationId,
) -> Result<Option<LocationStock>, DbErr> {
    Entity::find()
        .filter(Column::ProductId.eq(product_id.as_string()))
        .filter(Column::LocationId.eq(location_id.as_string()))
        .one(conn)
        .await?
        .map(LocationStock::try_from)
        .transpose()
}

/// Прибавить количество к остатку товара в месте хранения
///
/// Строка создаётся, если её ещё нет; иначе `quantity = quantity + n`
/// одним INSERT ... ON CONFLICT.
pub async fn upsert_increment<C: ConnectionTrait>(
    conn: &C,
    product_id: ProductId,
    location_id: LocationId,
    quantity: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        product_id: Set(product_id.as_string()),
        location_id: Set(location_id.as_string()),
        quantity: Set(quantity),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Entity::insert(active)
        .on_conflict(
            OnConflict::columns([Column::ProductId, Column::LocationId])
                .value(
                    Column::Quantity,
                    Expr::col((Entity, Column::Quantity)).add(quantity),
                )
                .value(Column::UpdatedAt, Expr::value(now))
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_location::service::ensure_default_locations;
    use crate::domain::a004_product::repository as product_repository;
    use crate::shared::config::ImportSettings;
    use crate::shared::data::db::test_connection;
    use contracts::domain::a004_product::{Product, ProductPrices};

    #[tokio::test]
    async fn test_upsert_increment_creates_then_adds() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let product = Product {
            id: ProductId::new_v4(),
            product_code: "C3".to_string(),
            name: "Kopi".to_string(),
            description: String::new(),
            stock: 0,
            prices: ProductPrices::default(),
            category_id: None,
            supplier_id: None,
            location_id: locations.master.id,
            metadata: EntityMetadata::default(),
        };
        product_repository::insert(&db, &product).await.unwrap();
        let warehouse = locations.distribution.id;

        upsert_increment(&db, product.id, warehouse, 5, chrono::Utc::now())
            .await
            .unwrap();
        upsert_increment(&db, product.id, warehouse, 3, chrono::Utc::now())
            .await
            .unwrap();

        let row = find(&db, product.id, warehouse).await.unwrap().unwrap();
        assert_eq!(row.quantity, 8);
        assert!(find(&db, product.id, locations.master.id)
            .await
            .unwrap()
            .is_none());
    }
}
