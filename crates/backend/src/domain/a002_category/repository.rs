use contracts::domain::a001_location::LocationId;
use contracts::domain::a002_category::{Category, CategoryId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::shared::data::db::is_unique_violation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub location_id: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Category {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Category {
            id: CategoryId::from_string(&m.id).map_err(DbErr::Custom)?,
            location_id: LocationId::from_string(&m.location_id).map_err(DbErr::Custom)?,
            name: m.name,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

pub async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    location_id: LocationId,
    name: &str,
) -> Result<Option<Category>, DbErr> {
    Entity::find()
        .filter(Column::LocationId.eq(location_id.as_string()))
        .filter(Column::Name.eq(name))
        .one(conn)
        .await?
        .map(Category::try_from)
        .transpose()
}

pub async fn list_by_location<C: ConnectionTrait>(
    conn: &C,
    location_id: LocationId,
) -> Result<Vec<Category>, DbErr> {
    Entity::find()
        .filter(Column::LocationId.eq(location_id.as_string()))
        .order_by_asc(Column::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(Category::try_from)
        .collect()
}

pub async fn insert<C: ConnectionTrait>(conn: &C, category: &Category) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(category.id.as_string()),
        location_id: Set(category.location_id.as_string()),
        name: Set(category.name.clone()),
        created_at: Set(category.metadata.created_at),
        updated_at: Set(category.metadata.updated_at),
    };
    Entity::insert(active).exec_without_returning(conn).await?;
    Ok(())
}

/// Найти категорию по имени в месте хранения или создать её
pub async fn get_or_create<C>(
    conn: &C,
    location_id: LocationId,
    name: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Category, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    if let Some(existing) = find_by_name(conn, location_id, name).await? {
        return Ok(existing);
    }

    let mut category = Category::new_for_insert(location_id, name.to_string());
    category.metadata = EntityMetadata::new_at(now);
    insert_or_fetch(conn, category).await
}

/// Вставить категорию в savepoint; если имя уже занято (UNIQUE location_id+name),
/// откатить savepoint и вернуть существующую запись
pub async fn insert_or_fetch<C>(conn: &C, category: Category) -> Result<Category, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let savepoint = conn.begin().await?;
    match insert(&savepoint, &category).await {
        Ok(()) => {
            savepoint.commit().await?;
            tracing::debug!("Created category '{}'", category.name);
            Ok(category)
        }
        Err(e) if is_unique_violation(&e) => {
            savepoint.rollback().await?;
            tracing::debug!("Category '{}' created concurrently, re-fetching", category.name);
            find_by_name(conn, category.location_id, &category.name)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("category '{}'", category.name)))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_location::service::ensure_default_locations;
    use crate::shared::config::ImportSettings;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn test_get_or_create_reuses_existing_row() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let master = locations.master.id;
        let now = chrono::Utc::now();

        let first = get_or_create(&db, master, "Sembako", now).await.unwrap();
        let second = get_or_create(&db, master, "Sembako", now).await.unwrap();
        get_or_create(&db, master, "Minuman", now).await.unwrap();

        assert_eq!(first.id, second.id);
        let names: Vec<String> = list_by_location(&db, master)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Minuman".to_string(), "Sembako".to_string()]);
    }

    #[tokio::test]
    async fn test_same_name_in_other_location_is_separate() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let now = chrono::Utc::now();

        let a = get_or_create(&db, locations.master.id, "Sembako", now)
            .await
            .unwrap();
        let b = get_or_create(&db, locations.distribution.id, "Sembako", now)
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_insert_or_fetch_returns_row_created_meanwhile() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let stored = Category::new_for_insert(locations.master.id, "Sembako".into());
        insert(&db, &stored).await.unwrap();

        let late = Category::new_for_insert(locations.master.id, "Sembako".into());
        let resolved = insert_or_fetch(&db, late).await.unwrap();

        assert_eq!(resolved.id, stored.id);
        assert_eq!(list_by_location(&db, locations.master.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_or_fetch_inside_transaction_keeps_it_usable() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let stored = Category::new_for_insert(locations.master.id, "Sembako".into());
        insert(&db, &stored).await.unwrap();

        let txn = db.begin().await.unwrap();
        let late = Category::new_for_insert(locations.master.id, "Sembako".into());
        let resolved = insert_or_fetch(&txn, late).await.unwrap();
        let other = Category::new_for_insert(locations.master.id, "Minuman".into());
        insert_or_fetch(&txn, other).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(resolved.id, stored.id);
        assert_eq!(list_by_location(&db, locations.master.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_reported_as_unique_violation() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let first = Category::new_for_insert(locations.master.id, "Sembako".into());
        insert(&db, &first).await.unwrap();

        let clash = Category::new_for_insert(locations.master.id, "Sembako".into());
        let err = insert(&db, &clash).await.unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
