use chrono::{DateTime, Utc};
use contracts::domain::a004_product::ProductPrices;
use std::collections::HashMap;

use super::headers::{self, Field};
use super::parser::ImportRow;

/// Как собирать поля записи, если код товара встречается в нескольких строках
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingPolicy {
    /// Все поля берутся из первой строки с этим кодом
    FirstRowWins,
    /// Все поля берутся из последней строки с этим кодом
    LastRowWins,
    /// Каждое поле - первое непустое значение среди строк с этим кодом
    MergeNonEmptyFields,
}

pub const DEFAULT_GROUPING_POLICY: GroupingPolicy = GroupingPolicy::FirstRowWins;

/// Наибольший допустимый остаток или цена в одной записи.
/// Суммы остатков при повторных импортах должны оставаться в i64.
pub const MAX_AMOUNT: i64 = 999_999_999_999;

/// Одна запись каталога на каждый уникальный код товара в файле
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalProductRecord {
    pub product_code: String,
    pub name: String,
    pub stock: i64,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
    pub description: String,
    pub prices: ProductPrices,
    pub imported_at: DateTime<Utc>,
    /// Первая строка файла с этим кодом
    pub source_line: usize,
}

impl CanonicalProductRecord {
    /// Первое числовое поле больше `MAX_AMOUNT`
    pub fn oversized_field(&self) -> Option<&'static str> {
        [
            ("stock", self.stock),
            ("purchase price", self.prices.purchase),
            ("retail price", self.prices.retail),
            ("silver price", self.prices.silver),
            ("gold price", self.prices.gold),
            ("platinum price", self.prices.platinum),
        ]
        .into_iter()
        .find(|(_, value)| *value > MAX_AMOUNT)
        .map(|(field, _)| field)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupingReport {
    pub records: Vec<CanonicalProductRecord>,
    /// Строки без распознаваемого кода товара
    pub skipped_lines: Vec<usize>,
}

/// Сгруппировать строки по коду товара в порядке первого появления
pub fn group_rows(
    rows: &[ImportRow],
    policy: GroupingPolicy,
    imported_at: DateTime<Utc>,
) -> GroupingReport {
    let mut groups: Vec<(String, Vec<&ImportRow>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut skipped_lines = Vec::new();

    for row in rows {
        let Some(code) = headers::lookup(row, Field::ProductCode) else {
            tracing::warn!(line = row.line, "Row skipped: no product code");
            skipped_lines.push(row.line);
            continue;
        };
        match positions.get(code) {
            Some(&pos) => groups[pos].1.push(row),
            None => {
                positions.insert(code.to_string(), groups.len());
                groups.push((code.to_string(), vec![row]));
            }
        }
    }

    let records = groups
        .into_iter()
        .map(|(code, group)| build_record(code, &group, policy, imported_at))
        .collect();

    GroupingReport {
        records,
        skipped_lines,
    }
}

fn build_record(
    product_code: String,
    group: &[&ImportRow],
    policy: GroupingPolicy,
    imported_at: DateTime<Utc>,
) -> CanonicalProductRecord {
    let text = |field: Field| field_value(group, field, policy).map(str::to_string);
    let number = |field: Field| field_value(group, field, policy).map_or(0, parse_amount);

    CanonicalProductRecord {
        product_code,
        name: text(Field::Name).unwrap_or_default(),
        stock: number(Field::Stock),
        category_name: text(Field::Category),
        supplier_name: text(Field::Supplier),
        description: text(Field::Description).unwrap_or_default(),
        prices: ProductPrices {
            purchase: number(Field::PurchasePrice),
            retail: number(Field::RetailPrice),
            silver: number(Field::SilverPrice),
            gold: number(Field::GoldPrice),
            platinum: number(Field::PlatinumPrice),
        },
        imported_at,
        source_line: group.first().map_or(0, |r| r.line),
    }
}

fn field_value<'a>(group: &[&'a ImportRow], field: Field, policy: GroupingPolicy) -> Option<&'a str> {
    match policy {
        GroupingPolicy::FirstRowWins => group.first().and_then(|r| headers::lookup(r, field)),
        GroupingPolicy::LastRowWins => group.last().and_then(|r| headers::lookup(r, field)),
        GroupingPolicy::MergeNonEmptyFields => {
            group.iter().find_map(|r| headers::lookup(r, field))
        }
    }
}

/// Целое по ведущим цифрам: "15000.00" -> 15000, "12 pcs" -> 12.
/// Нечисловые и отрицательные значения дают 0, слишком длинные - i64::MAX
/// (такую запись отклоняет проверка `MAX_AMOUNT`).
pub fn parse_amount(raw: &str) -> i64 {
    let s = raw.trim();
    let digits = s.strip_prefix('+').unwrap_or(s);
    if digits.starts_with('-') {
        return 0;
    }

    let mut value: i64 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else { break };
        value = value.saturating_mul(10).saturating_add(i64::from(d));
    }
    value
}
