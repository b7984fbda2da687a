use contracts::domain::a001_location::{Location, LocationKind};
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

use super::repository;
use crate::shared::config::ImportSettings;
use crate::shared::data::db::is_unique_violation;

/// Места хранения, с которыми работает импорт каталога
#[derive(Debug, Clone)]
pub struct DefaultLocations {
    /// Владелец карточек товаров, категорий и поставщиков
    pub master: Location,
    /// Склад, на который приходуются остатки из файла
    pub distribution: Location,
}

/// Найти место хранения по коду или создать его
///
/// Идемпотентно: если место создал параллельный запрос, используется оно.
pub async fn ensure_location<C>(
    conn: &C,
    code: &str,
    name: &str,
    kind: LocationKind,
) -> Result<Location, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    if let Some(existing) = repository::find_by_code(conn, code).await? {
        if existing.kind != kind {
            tracing::warn!(
                "Location '{}' exists with kind '{}', expected '{}'",
                code,
                existing.kind.as_str(),
                kind.as_str()
            );
        }
        return Ok(existing);
    }

    let location = Location::new_for_insert(code.to_string(), name.to_string(), kind);
    insert_or_fetch(conn, location).await
}

/// Вставить место в savepoint; при занятом коде вернуть существующее
async fn insert_or_fetch<C>(conn: &C, location: Location) -> Result<Location, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let savepoint = conn.begin().await?;
    match repository::insert(&savepoint, &location).await {
        Ok(()) => {
            savepoint.commit().await?;
            tracing::info!(
                "Created {} location '{}' ({})",
                location.kind.as_str(),
                location.code,
                location.name
            );
            Ok(location)
        }
        Err(e) if is_unique_violation(&e) => {
            savepoint.rollback().await?;
            repository::find_by_code(conn, &location.code)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("location '{}'", location.code)))
        }
        Err(e) => Err(e),
    }
}

/// Bootstrap master- и distribution-мест, вызывается в начале каждого импорта
pub async fn ensure_default_locations<C>(
    conn: &C,
    settings: &ImportSettings,
) -> Result<DefaultLocations, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let master = ensure_location(
        conn,
        &settings.master_location_code,
        &settings.master_location_name,
        LocationKind::Master,
    )
    .await?;
    let distribution = ensure_location(
        conn,
        &settings.distribution_location_code,
        &settings.distribution_location_name,
        LocationKind::Distribution,
    )
    .await?;
    Ok(DefaultLocations {
        master,
        distribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    #[tokio::test]
    async fn test_ensure_default_locations_is_idempotent() {
        let db = test_connection().await;
        let settings = ImportSettings::default();

        let first = ensure_default_locations(&db, &settings).await.unwrap();
        let second = ensure_default_locations(&db, &settings).await.unwrap();

        assert_eq!(first.master.id, second.master.id);
        assert_eq!(first.distribution.id, second.distribution.id);
        assert_eq!(first.master.kind, LocationKind::Master);
        assert_eq!(first.distribution.kind, LocationKind::Distribution);
        assert_ne!(first.master.id, first.distribution.id);
    }

    #[tokio::test]
    async fn test_insert_or_fetch_returns_location_created_meanwhile() {
        let db = test_connection().await;
        let settings = ImportSettings::default();
        let stored = ensure_default_locations(&db, &settings).await.unwrap();

        let late = Location::new_for_insert(
            settings.master_location_code.clone(),
            "Другое имя".to_string(),
            LocationKind::Master,
        );
        let resolved = insert_or_fetch(&db, late).await.unwrap();

        assert_eq!(resolved.id, stored.master.id);
        assert_eq!(resolved.name, stored.master.name);
    }
}
