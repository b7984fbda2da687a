use contracts::usecases::u501_import_catalog::DuplicateProduct;
use sea_orm::{ConnectionTrait, DbErr};
use std::collections::HashMap;

use super::grouper::CanonicalProductRecord;
use crate::domain::a004_product::repository as product_repository;

/// Результат проверки пакета на товары, уже существующие в каталоге
#[derive(Debug, Clone, Default)]
pub struct DuplicateScan {
    pub existing: Vec<DuplicateProduct>,
    pub new_count: usize,
}

impl DuplicateScan {
    pub fn has_duplicates(&self) -> bool {
        !self.existing.is_empty()
    }
}

/// Разделить записи на новые и существующие (поиск по коду во всех местах хранения)
///
/// Только чтение, в базу ничего не пишется.
pub async fn scan<C: ConnectionTrait>(
    conn: &C,
    records: &[CanonicalProductRecord],
) -> Result<DuplicateScan, DbErr> {
    let codes: Vec<String> = records.iter().map(|r| r.product_code.clone()).collect();
    let stored: HashMap<String, i64> = product_repository::find_by_codes(conn, &codes)
        .await?
        .into_iter()
        .map(|p| (p.product_code, p.stock))
        .collect();

    let mut scan = DuplicateScan::default();
    for record in records {
        match stored.get(&record.product_code) {
            Some(&current_stock) => scan.existing.push(DuplicateProduct {
                product_code: record.product_code.clone(),
                product_name: record.name.clone(),
                stock_to_add: record.stock,
                current_stock,
            }),
            None => scan.new_count += 1,
        }
    }

    tracing::debug!(
        existing = scan.existing.len(),
        new = scan.new_count,
        "Duplicate scan finished"
    );
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_location::service::ensure_default_locations;
    use crate::shared::config::ImportSettings;
    use crate::shared::data::db::test_connection;
    use crate::usecases::u501_import_catalog::grouper::{group_rows, DEFAULT_GROUPING_POLICY};
    use crate::usecases::u501_import_catalog::parser::ImportRow;
    use chrono::Utc;
    use contracts::domain::a004_product::{Product, ProductId, ProductPrices};
    use contracts::domain::common::EntityMetadata;

    #[tokio::test]
    async fn test_scan_partitions_existing_and_new() {
        let db = test_connection().await;
        let locations = ensure_default_locations(&db, &ImportSettings::default())
            .await
            .unwrap();
        product_repository::insert(
            &db,
            &Product {
                id: ProductId::new_v4(),
                product_code: "A1".into(),
                name: "Gula lama".into(),
                description: String::new(),
                stock: 4,
                prices: ProductPrices::default(),
                category_id: None,
                supplier_id: None,
                // Товар другого места хранения тоже считается дубликатом
                location_id: locations.distribution.id,
                metadata: EntityMetadata::default(),
            },
        )
        .await
        .unwrap();

        let rows = vec![
            ImportRow::new(
                2,
                vec![
                    ("Kode".into(), "A1".into()),
                    ("Nama".into(), "Gula".into()),
                    ("Stok".into(), "10".into()),
                ],
            ),
            ImportRow::new(3, vec![("Kode".into(), "B2".into()), ("Stok".into(), "5".into())]),
            ImportRow::new(4, vec![("Kode".into(), "C3".into())]),
        ];
        let records = group_rows(&rows, DEFAULT_GROUPING_POLICY, Utc::now()).records;

        let result = scan(&db, &records).await.unwrap();

        assert!(result.has_duplicates());
        assert_eq!(result.new_count, 2);
        assert_eq!(
            result.existing,
            vec![DuplicateProduct {
                product_code: "A1".into(),
                product_name: "Gula".into(),
                stock_to_add: 10,
                current_stock: 4,
            }]
        );
    }
}
