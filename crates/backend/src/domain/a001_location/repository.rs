use contracts::domain::a001_location::{Location, LocationId, LocationKind};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_location")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub name: String,
    pub kind: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Location {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let id = LocationId::from_string(&m.id).map_err(DbErr::Custom)?;
        let kind = LocationKind::parse(&m.kind)
            .ok_or_else(|| DbErr::Custom(format!("Unknown location kind '{}'", m.kind)))?;
        Ok(Location {
            id,
            code: m.code,
            name: m.name,
            kind,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
        })
    }
}

pub async fn find_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> Result<Option<Location>, DbErr> {
    Entity::find()
        .filter(Column::Code.eq(code))
        .one(conn)
        .await?
        .map(Location::try_from)
        .transpose()
}

pub async fn insert<C: ConnectionTrait>(conn: &C, location: &Location) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(location.id.as_string()),
        code: Set(location.code.clone()),
        name: Set(location.name.clone()),
        kind: Set(location.kind.as_str().to_string()),
        created_at: Set(location.metadata.created_at),
        updated_at: Set(location.metadata.updated_at),
    };
    Entity::insert(active).exec_without_returning(conn).await?;
    Ok(())
}
