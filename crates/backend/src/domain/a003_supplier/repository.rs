use contracts::domain::a001_location::LocationId;
use contracts::domain::a003_supplier::{Supplier, SupplierId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::code;
use crate::shared::data::db::is_unique_violation;

/// Сколько раз пробуем вставить поставщика, если код заняли параллельно
const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_supplier")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub location_id: String,
    pub code: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Supplier {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Supplier {
            id: SupplierId::from_string(&m.id).map_err(DbErr::Custom)?,
            location_id: LocationId::from_string(&m.location_id).map_err(DbErr::Custom)?,
            code: m.code,
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
) -> Result<Option<Supplier>, DbErr> {
    Entity::find()
        .filter(Column::LocationId.eq(location_id.as_string()))
        .filter(Column::Name.eq(name))
        .one(conn)
        .await?
        .map(Supplier::try_from)
        .transpose()
}

pub async fn list_by_location<C: ConnectionTrait>(
    conn: &C,
    location_id: LocationId,
) -> Result<Vec<Supplier>, DbErr> {
    Entity::find()
        .filter(Column::LocationId.eq(location_id.as_string()))
        .order_by_asc(Column::Code)
        .all(conn)
        .await?
        .into_iter()
        .map(Supplier::try_from)
        .collect()
}

/// Коды поставщиков места хранения, начинающиеся с `prefix`
async fn codes_with_prefix<C: ConnectionTrait>(
    conn: &C,
    location_id: LocationId,
    prefix: &str,
) -> Result<HashSet<String>, DbErr> {
    let codes: Vec<String> = Entity::find()
        .select_only()
        .column(Column::Code)
        .filter(Column::LocationId.eq(location_id.as_string()))
        .filter(Column::Code.starts_with(prefix))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(codes.into_iter().collect())
}

pub async fn insert<C: ConnectionTrait>(conn: &C, supplier: &Supplier) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(supplier.id.as_string()),
        location_id: Set(supplier.location_id.as_string()),
        code: Set(supplier.code.clone()),
        name: Set(supplier.name.clone()),
        created_at: Set(supplier.metadata.created_at),
        updated_at: Set(supplier.metadata.updated_at),
    };
    Entity::insert(active).exec_without_returning(conn).await?;
    Ok(())
}

/// Найти поставщика по имени в месте хранения или создать его
///
/// Код генерируется из имени и дополняется суффиксом до первого свободного.
pub async fn get_or_create<C>(
    conn: &C,
    location_id: LocationId,
    name: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Supplier, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    if let Some(existing) = find_by_name(conn, location_id, name).await? {
        return Ok(existing);
    }

    let base = code::derive_base_code(name);
    let taken = codes_with_prefix(conn, location_id, &base).await?;
    insert_with_free_code(conn, location_id, name, taken, now).await
}

/// Вставить поставщика с первым кодом, которого нет в `taken`
///
/// Нарушение UNIQUE при вставке означает либо того же поставщика, созданного
/// параллельно (перечитываем по имени), либо занятый код (берём следующий).
pub async fn insert_with_free_code<C>(
    conn: &C,
    location_id: LocationId,
    name: &str,
    mut taken: HashSet<String>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Supplier, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let base = code::derive_base_code(name);

    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = code::first_free_code(&base, &taken);
        let mut supplier = Supplier::new_for_insert(location_id, code.clone(), name.to_string());
        supplier.metadata = EntityMetadata::new_at(now);

        let savepoint = conn.begin().await?;
        match insert(&savepoint, &supplier).await {
            Ok(()) => {
                savepoint.commit().await?;
                tracing::debug!("Created supplier '{}' with code {}", name, code);
                return Ok(supplier);
            }
            Err(e) if is_unique_violation(&e) => {
                savepoint.rollback().await?;
                if let Some(existing) = find_by_name(conn, location_id, name).await? {
                    return Ok(existing);
                }
                tracing::debug!("Supplier code {} taken concurrently, retrying", code);
                taken.insert(code);
            }
            Err(e) => return Err(e),
        }
    }

    Err(DbErr::Custom(format!(
        "Could not allocate a unique supplier code for '{}'",
        name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_location::service::ensure_default_locations;
    use crate::shared::config::ImportSettings;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn test_colliding_codes_get_numeric_suffix() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let master = locations.master.id;
        let now = chrono::Utc::now();

        let first = get_or_create(&db, master, "Sumber Rejeki", now).await.unwrap();
        let second = get_or_create(&db, master, "Sumber Makmur", now).await.unwrap();
        let third = get_or_create(&db, master, "SUMBER-Jaya", now).await.unwrap();

        assert_eq!(first.code, "SUMBE");
        assert_eq!(second.code, "SUMBE1");
        assert_eq!(third.code, "SUMBE2");
        assert_eq!(list_by_location(&db, master).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_existing_supplier_is_reused_by_name() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let master = locations.master.id;
        let now = chrono::Utc::now();

        let first = get_or_create(&db, master, "CV Maju", now).await.unwrap();
        let again = get_or_create(&db, master, "CV Maju", now).await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(first.code, "CVMAJ");
        assert_eq!(list_by_location(&db, master).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_code_taken_by_other_supplier_moves_to_next_suffix() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let master = locations.master.id;
        let now = chrono::Utc::now();
        let stored = get_or_create(&db, master, "Sumber Rejeki", now).await.unwrap();

        // SUMBE не попал в taken: первая вставка упирается в UNIQUE по коду
        let created = insert_with_free_code(&db, master, "Sumber Makmur", HashSet::new(), now)
            .await
            .unwrap();

        assert_eq!(stored.code, "SUMBE");
        assert_eq!(created.code, "SUMBE1");
        assert_ne!(created.id, stored.id);
        assert_eq!(list_by_location(&db, master).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_same_name_created_meanwhile_is_returned() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let master = locations.master.id;
        let now = chrono::Utc::now();
        let stored = get_or_create(&db, master, "Sumber Rejeki", now).await.unwrap();

        let resolved = insert_with_free_code(&db, master, "Sumber Rejeki", HashSet::new(), now)
            .await
            .unwrap();

        assert_eq!(resolved.id, stored.id);
        assert_eq!(resolved.code, "SUMBE");
        assert_eq!(list_by_location(&db, master).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_bounded_attempts() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        let master = locations.master.id;
        let now = chrono::Utc::now();
        for name in ["Sumber A", "Sumber B", "Sumber C", "Sumber D", "Sumber E"] {
            get_or_create(&db, master, name, now).await.unwrap();
        }

        let err = insert_with_free_code(&db, master, "Sumber F", HashSet::new(), now)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Sumber F"), "{}", err);
        assert_eq!(list_by_location(&db, master).await.unwrap().len(), 5);
    }
}
