use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ingestion_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub endpoint: String,
    pub source_type: String,
    pub default_posting_type: String,
    pub run_frequency_minutes: i64,
    pub enabled: bool,
    pub last_run_at: Option<DateTimeUtc>,
    pub last_success_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ingestion_runs::Entity")]
    IngestionRuns,
}

impl Related<super::ingestion_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngestionRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
