use crate::domain::common::{aggregate_id::parse_uuid, AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub Uuid);

impl LocationId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl AggregateId for LocationId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        parse_uuid(s).map(LocationId)
    }
}

// ============================================================================
// Kind
// ============================================================================

/// Тип места хранения
///
/// `Master` владеет справочниками (товары, категории, поставщики),
/// `Distribution` получает остатки при импорте, `Store` - торговая точка.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Master,
    Store,
    Distribution,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Master => "master",
            LocationKind::Store => "store",
            LocationKind::Distribution => "distribution",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "master" => Some(LocationKind::Master),
            "store" => Some(LocationKind::Store),
            "distribution" => Some(LocationKind::Distribution),
            _ => None,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub code: String,
    pub name: String,
    pub kind: LocationKind,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Location {
    pub fn new_for_insert(code: String, name: String, kind: LocationKind) -> Self {
        Self {
            id: LocationId::new_v4(),
            code,
            name,
            kind,
            metadata: EntityMetadata::default(),
        }
    }
}
