use crate::domain::a001_location::LocationId;
use crate::domain::common::{aggregate_id::parse_uuid, AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierId(pub Uuid);

impl SupplierId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl AggregateId for SupplierId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        parse_uuid(s).map(SupplierId)
    }
}

/// Поставщик
///
/// `code` - короткий бизнес-код, уникальный в пределах места хранения.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    #[serde(rename = "locationId")]
    pub location_id: LocationId,
    pub code: String,
    pub name: String,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Supplier {
    pub fn new_for_insert(location_id: LocationId, code: String, name: String) -> Self {
        Self {
            id: SupplierId::new_v4(),
            location_id,
            code,
            name,
            metadata: EntityMetadata::default(),
        }
    }
}
