use crate::domain::a001_location::LocationId;
use crate::domain::a002_category::CategoryId;
use crate::domain::a003_supplier::SupplierId;
use crate::domain::common::{aggregate_id::parse_uuid, AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl AggregateId for ProductId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        parse_uuid(s).map(ProductId)
    }
}

// ============================================================================
// Prices
// ============================================================================

/// Уровень цены в лестнице клиентских цен
///
/// Лестница: retail -> silver -> gold -> platinum, каждая следующая цена
/// не может быть выше предыдущей.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLevel {
    Retail,
    Silver,
    Gold,
    Platinum,
}

impl PriceLevel {
    /// Уровни клиентских цен сверху вниз
    pub const LADDER: [PriceLevel; 4] = [
        PriceLevel::Retail,
        PriceLevel::Silver,
        PriceLevel::Gold,
        PriceLevel::Platinum,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PriceLevel::Retail => "retail",
            PriceLevel::Silver => "silver",
            PriceLevel::Gold => "gold",
            PriceLevel::Platinum => "platinum",
        }
    }
}

impl std::fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Цены товара (целые суммы в валюте магазина)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPrices {
    #[serde(rename = "purchasePrice", default)]
    pub purchase: i64,
    #[serde(rename = "retailPrice", default)]
    pub retail: i64,
    #[serde(rename = "silverPrice", default)]
    pub silver: i64,
    #[serde(rename = "goldPrice", default)]
    pub gold: i64,
    #[serde(rename = "platinumPrice", default)]
    pub platinum: i64,
}

impl ProductPrices {
    pub fn level(&self, level: PriceLevel) -> i64 {
        match level {
            PriceLevel::Retail => self.retail,
            PriceLevel::Silver => self.silver,
            PriceLevel::Gold => self.gold,
            PriceLevel::Platinum => self.platinum,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    /// Код товара, глобально уникален по всем местам хранения
    #[serde(rename = "productCode")]
    pub product_code: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub stock: i64,

    #[serde(flatten)]
    pub prices: ProductPrices,

    #[serde(rename = "categoryId")]
    pub category_id: Option<CategoryId>,

    #[serde(rename = "supplierId")]
    pub supplier_id: Option<SupplierId>,

    /// Место хранения - владелец карточки товара
    #[serde(rename = "locationId")]
    pub location_id: LocationId,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prices_level_lookup() {
        let prices = ProductPrices {
            purchase: 9000,
            retail: 15000,
            silver: 14000,
            gold: 13000,
            platinum: 12000,
        };
        let values: Vec<i64> = PriceLevel::LADDER
            .iter()
            .map(|l| prices.level(*l))
            .collect();
        assert_eq!(values, vec![15000, 14000, 13000, 12000]);
    }

    #[test]
    fn test_prices_serialize_camel_case() {
        let prices = ProductPrices {
            retail: 100,
            ..Default::default()
        };
        let json = serde_json::to_value(prices).unwrap();
        assert_eq!(json["retailPrice"], 100);
        assert_eq!(json["platinumPrice"], 0);
    }
}
