use crate::domain::a001_location::LocationId;
use crate::domain::common::{aggregate_id::parse_uuid, AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub Uuid);

impl CategoryId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl AggregateId for CategoryId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        parse_uuid(s).map(CategoryId)
    }
}

/// Категория товара. Имя уникально в пределах места хранения.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "locationId")]
    pub location_id: LocationId,
    pub name: String,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Category {
    pub fn new_for_insert(location_id: LocationId, name: String) -> Self {
        Self {
            id: CategoryId::new_v4(),
            location_id,
            name,
            metadata: EntityMetadata::default(),
        }
    }
}
