use contracts::domain::a004_product::{Product, ProductId};
use contracts::domain::common::EntityMetadata;
use contracts::usecases::u501_import_catalog::{ConflictMode, ImportOptions};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use super::error::RecordError;
use super::grouper::{CanonicalProductRecord, MAX_AMOUNT};
use super::price_tiers;
use crate::domain::a001_location::service::DefaultLocations;
use crate::domain::a002_category::repository as category_repository;
use crate::domain::a003_supplier::repository as supplier_repository;
use crate::domain::a004_product::repository::{self as product_repository, ProductOverwrite};
use crate::domain::a005_location_stock::repository as location_stock_repository;

/// Что делать с записью, код которой уже есть в каталоге
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Перезаписать карточку и прибавить остаток
    Overwrite,
    /// Только прибавить остаток
    IncrementOnly,
    /// Запись падает с "already exists" (товар появился после проверки дубликатов)
    Reject,
}

impl ConflictPolicy {
    pub fn from_options(options: &ImportOptions) -> Self {
        if !options.force {
            return ConflictPolicy::Reject;
        }
        match options.mode {
            ConflictMode::Overwrite => ConflictPolicy::Overwrite,
            ConflictMode::IncrementOnly => ConflictPolicy::IncrementOnly,
        }
    }
}

/// Итог обработки одной записи
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported { created: bool },
    Failed(String),
}

/// Применить одну запись в собственной транзакции
///
/// Любая ошибка откатывает только эту запись и превращается в `Failed`.
pub async fn reconcile_record(
    db: &DatabaseConnection,
    locations: &DefaultLocations,
    record: &CanonicalProductRecord,
    policy: ConflictPolicy,
) -> ImportOutcome {
    match apply_record(db, locations, record, policy).await {
        Ok(created) => {
            tracing::debug!(
                product_code = %record.product_code,
                created,
                "Record imported"
            );
            ImportOutcome::Imported { created }
        }
        Err(e) => {
            tracing::warn!(
                product_code = %record.product_code,
                line = record.source_line,
                "Record failed: {}",
                e
            );
            ImportOutcome::Failed(e.to_string())
        }
    }
}

async fn apply_record(
    db: &DatabaseConnection,
    locations: &DefaultLocations,
    record: &CanonicalProductRecord,
    policy: ConflictPolicy,
) -> Result<bool, RecordError> {
    let code = record.product_code.as_str();
    let txn = db.begin().await.map_err(|e| RecordError::storage(code, e))?;

    match apply_in_transaction(&txn, locations, record, policy).await {
        Ok(created) => {
            txn.commit().await.map_err(|e| RecordError::storage(code, e))?;
            Ok(created)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Rollback failed for product {}: {}", code, rollback_err);
            }
            Err(e)
        }
    }
}

/// Шаги записи внутри транзакции; возвращает `true`, если товар создан
async fn apply_in_transaction(
    txn: &DatabaseTransaction,
    locations: &DefaultLocations,
    record: &CanonicalProductRecord,
    policy: ConflictPolicy,
) -> Result<bool, RecordError> {
    let code = record.product_code.as_str();
    let storage = |e| RecordError::storage(code, e);
    let now = record.imported_at;

    if let Some(field) = record.oversized_field() {
        return Err(RecordError::AmountOutOfRange {
            product_code: record.product_code.clone(),
            field,
            max: MAX_AMOUNT,
        });
    }
    price_tiers::validate(code, &record.prices)?;

    let existing = product_repository::find_by_code(txn, code)
        .await
        .map_err(storage)?;

    let (product_id, created) = match existing {
        None => {
            let fields = resolve_fields(txn, locations, record).await?;
            let product = Product {
                id: ProductId::new_v4(),
                product_code: record.product_code.clone(),
                name: fields.name,
                description: fields.description,
                stock: record.stock,
                prices: fields.prices,
                category_id: fields.category_id,
                supplier_id: fields.supplier_id,
                location_id: locations.master.id,
                metadata: EntityMetadata::new_at(now),
            };
            product_repository::insert(txn, &product)
                .await
                .map_err(storage)?;
            (product.id, true)
        }
        Some(product) => match policy {
            ConflictPolicy::Reject => {
                return Err(RecordError::AlreadyExists {
                    product_code: record.product_code.clone(),
                });
            }
            ConflictPolicy::Overwrite => {
                let fields = resolve_fields(txn, locations, record).await?;
                product_repository::overwrite(txn, product.id, &fields, record.stock, now)
                    .await
                    .map_err(storage)?;
                (product.id, false)
            }
            ConflictPolicy::IncrementOnly => {
                product_repository::increment_stock(txn, product.id, record.stock, now)
                    .await
                    .map_err(storage)?;
                (product.id, false)
            }
        },
    };

    location_stock_repository::upsert_increment(
        txn,
        product_id,
        locations.distribution.id,
        record.stock,
        now,
    )
    .await
    .map_err(storage)?;

    Ok(created)
}

/// Поля карточки из записи, с категорией и поставщиком master-места
async fn resolve_fields(
    txn: &DatabaseTransaction,
    locations: &DefaultLocations,
    record: &CanonicalProductRecord,
) -> Result<ProductOverwrite, RecordError> {
    let storage = |e| RecordError::storage(&record.product_code, e);
    let master = locations.master.id;

    let category_id = match non_empty(&record.category_name) {
        Some(name) => Some(
            category_repository::get_or_create(txn, master, name, record.imported_at)
                .await
                .map_err(storage)?
                .id,
        ),
        None => None,
    };
    let supplier_id = match non_empty(&record.supplier_name) {
        Some(name) => Some(
            supplier_repository::get_or_create(txn, master, name, record.imported_at)
                .await
                .map_err(storage)?
                .id,
        ),
        None => None,
    };

    Ok(ProductOverwrite {
        name: record.name.clone(),
        description: record.description.clone(),
        prices: record.prices,
        category_id,
        supplier_id,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
