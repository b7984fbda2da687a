use crate::domain::a001_location::LocationId;
use crate::domain::a004_product::ProductId;
use crate::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};

/// Остаток товара в конкретном месте хранения
///
/// Пара (product_id, location_id) уникальна, quantity не бывает отрицательным.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationStock {
    pub id: String,
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    #[serde(rename = "locationId")]
    pub location_id: LocationId,
    pub quantity: i64,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}
