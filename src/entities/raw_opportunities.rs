use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Insert-only audit row
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "raw_opportunities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub source_id: Uuid,
    pub run_id: Uuid,
    pub source_external_id: Option<String>,
    pub status: String,
    pub raw_payload: Json,
    pub title: String,
    pub company: String,
    pub apply_link: Option<String>,
    pub suggested_type: String,
    pub fresher_score: i32,
    pub reason_flags: Json,
    pub mapped_posting_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ingestion_runs::Entity",
        from = "Column::RunId",
        to = "super::ingestion_runs::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    IngestionRuns,
}

impl Related<super::ingestion_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngestionRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
