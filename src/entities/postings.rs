use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "postings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub posting_type: String,
    pub status: String,
    pub title: String,
    pub company: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub apply_link: Option<String>,
    pub locations: Json,
    pub work_mode: Option<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub allowed_passout_years: Json,
    pub required_skills: Json,
    pub allowed_education_levels: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub provenance_note: Option<String>,
    pub created_by: String,
    pub link_health: String,
    pub verification_failures: i32,
    pub last_verified_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
