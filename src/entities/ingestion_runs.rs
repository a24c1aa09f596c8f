use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ingestion_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub source_id: Uuid,
    pub status: String,
    pub started_at: DateTimeUtc,
    pub finished_at: Option<DateTimeUtc>,
    pub fetched_count: i32,
    pub draft_created_count: i32,
    pub deduped_count: i32,
    pub rejected_count: i32,
    pub error_count: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_summary: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ingestion_sources::Entity",
        from = "Column::SourceId",
        to = "super::ingestion_sources::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    IngestionSources,
    #[sea_orm(has_many = "super::raw_opportunities::Entity")]
    RawOpportunities,
}

impl Related<super::ingestion_sources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngestionSources.def()
    }
}

impl Related<super::raw_opportunities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RawOpportunities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
