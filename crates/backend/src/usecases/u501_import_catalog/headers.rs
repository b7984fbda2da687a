use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::parser::ImportRow;

/// Логическое поле карточки товара в файле импорта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ProductCode,
    Name,
    Stock,
    Category,
    Supplier,
    Description,
    PurchasePrice,
    RetailPrice,
    SilverPrice,
    GoldPrice,
    PlatinumPrice,
}

/// Синонимы заголовков колонок по полям, в порядке приоритета.
/// Первый синоним - канонический заголовок шаблона.
const SYNONYMS: &[(Field, &[&str])] = &[
    (
        Field::ProductCode,
        &["Kode Produk", "productCode", "kode_produk", "Kode", "code"],
    ),
    (Field::Name, &["Nama Produk", "name", "Nama", "productName"]),
    (Field::Stock, &["Stok", "stock", "Jumlah", "qty", "quantity"]),
    (Field::Category, &["Kategori", "category", "categoryName"]),
    (Field::Supplier, &["Supplier", "supplierName", "Pemasok"]),
    (Field::Description, &["Deskripsi", "description", "Keterangan"]),
    (Field::PurchasePrice, &["Harga Beli", "purchasePrice"]),
    (
        Field::RetailPrice,
        &["Harga Umum", "retailPrice", "Harga Jual", "price"],
    ),
    (Field::SilverPrice, &["Harga Silver", "silverPrice"]),
    (Field::GoldPrice, &["Harga Gold", "goldPrice"]),
    (Field::PlatinumPrice, &["Harga Platinum", "platinumPrice"]),
];

/// Нормализованный заголовок -> (поле, приоритет синонима)
static INDEX: Lazy<HashMap<String, (Field, usize)>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (field, names) in SYNONYMS {
        for (rank, name) in names.iter().enumerate() {
            // "Kode Produk" и "kode_produk" совпадают после нормализации
            index.entry(normalize(name)).or_insert((*field, rank));
        }
    }
    index
});

/// Регистр, пробелы, `_` и `-` в заголовках не различаются
pub fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-' && *c != '\u{feff}')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Значение поля в строке: непустая ячейка с самым приоритетным синонимом
pub fn lookup(row: &ImportRow, field: Field) -> Option<&str> {
    let mut best: Option<(usize, &str)> = None;
    for (header, value) in &row.cells {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if let Some(&(f, rank)) = INDEX.get(&normalize(header)) {
            if f == field && best.map_or(true, |(best_rank, _)| rank < best_rank) {
                best = Some((rank, value));
            }
        }
    }
    best.map(|(_, v)| v)
}

/// Канонические заголовки всех полей (строка заголовков шаблона)
pub fn canonical_headers() -> Vec<&'static str> {
    SYNONYMS.iter().map(|(_, names)| names[0]).collect()
}
