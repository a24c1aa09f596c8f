use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_ingestion_sources_table(manager).await?;
        self.create_postings_table(manager).await?;
        self.create_ingestion_runs_table(manager).await?;
        self.create_raw_opportunities_table(manager).await?;

        self.create_indexes(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RawOpportunities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IngestionRuns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Postings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IngestionSources::Table).to_owned())
            .await?;

        Ok(())
    }
}

impl Migration {
    fn create_id_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.uuid().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    fn create_nullable_uuid_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.uuid(),
            _ => col.string(),
        };
        col
    }

    fn create_timestamp_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone().not_null(),
            _ => col.string().not_null(),
        };
        col
    }

    fn create_nullable_timestamp_column(
        &self,
        manager: &SchemaManager,
        column: impl IntoIden,
    ) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone(),
            _ => col.string(),
        };
        col
    }

    async fn create_ingestion_sources_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IngestionSources::Table)
                    .if_not_exists()
                    .col(self.create_id_column(manager, IngestionSources::Id).primary_key())
                    .col(ColumnDef::new(IngestionSources::Name).string().not_null())
                    .col(ColumnDef::new(IngestionSources::Endpoint).string().not_null())
                    .col(ColumnDef::new(IngestionSources::SourceType).string().not_null())
                    .col(
                        ColumnDef::new(IngestionSources::DefaultPostingType)
                            .string()
                            .not_null()
                            .default("job"),
                    )
                    .col(
                        ColumnDef::new(IngestionSources::RunFrequencyMinutes)
                            .big_integer()
                            .not_null()
                            .default(60),
                    )
                    .col(
                        ColumnDef::new(IngestionSources::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(self.create_nullable_timestamp_column(manager, IngestionSources::LastRunAt))
                    .col(self.create_nullable_timestamp_column(manager, IngestionSources::LastSuccessAt))
                    .col(self.create_timestamp_column(manager, IngestionSources::CreatedAt))
                    .col(self.create_timestamp_column(manager, IngestionSources::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_postings_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Postings::Table)
                    .if_not_exists()
                    .col(self.create_id_column(manager, Postings::Id).primary_key())
                    .col(ColumnDef::new(Postings::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Postings::PostingType).string().not_null())
                    .col(ColumnDef::new(Postings::Status).string().not_null().default("draft"))
                    .col(ColumnDef::new(Postings::Title).string().not_null())
                    .col(ColumnDef::new(Postings::Company).string().not_null())
                    .col(ColumnDef::new(Postings::Description).text().not_null())
                    .col(ColumnDef::new(Postings::ApplyLink).string())
                    .col(ColumnDef::new(Postings::Locations).json().not_null())
                    .col(ColumnDef::new(Postings::WorkMode).string())
                    .col(ColumnDef::new(Postings::ExperienceMin).integer())
                    .col(ColumnDef::new(Postings::ExperienceMax).integer())
                    .col(ColumnDef::new(Postings::AllowedPassoutYears).json().not_null())
                    .col(ColumnDef::new(Postings::RequiredSkills).json().not_null())
                    .col(ColumnDef::new(Postings::AllowedEducationLevels).json().not_null())
                    .col(ColumnDef::new(Postings::ProvenanceNote).text())
                    .col(ColumnDef::new(Postings::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Postings::LinkHealth)
                            .string()
                            .not_null()
                            .default("healthy"),
                    )
                    .col(
                        ColumnDef::new(Postings::VerificationFailures)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(self.create_nullable_timestamp_column(manager, Postings::LastVerifiedAt))
                    .col(self.create_nullable_timestamp_column(manager, Postings::DeletedAt))
                    .col(self.create_timestamp_column(manager, Postings::CreatedAt))
                    .col(self.create_timestamp_column(manager, Postings::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_ingestion_runs_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IngestionRuns::Table)
                    .if_not_exists()
                    .col(self.create_id_column(manager, IngestionRuns::Id).primary_key())
                    .col(self.create_id_column(manager, IngestionRuns::SourceId))
                    .col(ColumnDef::new(IngestionRuns::Status).string().not_null())
                    .col(self.create_timestamp_column(manager, IngestionRuns::StartedAt))
                    .col(self.create_nullable_timestamp_column(manager, IngestionRuns::FinishedAt))
                    .col(ColumnDef::new(IngestionRuns::FetchedCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(IngestionRuns::DraftCreatedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(IngestionRuns::DedupedCount).integer().not_null().default(0))
                    .col(ColumnDef::new(IngestionRuns::RejectedCount).integer().not_null().default(0))
                    .col(ColumnDef::new(IngestionRuns::ErrorCount).integer().not_null().default(0))
                    .col(ColumnDef::new(IngestionRuns::ErrorSummary).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ingestion_runs_source_id")
                            .from(IngestionRuns::Table, IngestionRuns::SourceId)
                            .to(IngestionSources::Table, IngestionSources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_raw_opportunities_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RawOpportunities::Table)
                    .if_not_exists()
                    .col(self.create_id_column(manager, RawOpportunities::Id).primary_key())
                    .col(self.create_id_column(manager, RawOpportunities::SourceId))
                    .col(self.create_id_column(manager, RawOpportunities::RunId))
                    .col(ColumnDef::new(RawOpportunities::SourceExternalId).string())
                    .col(ColumnDef::new(RawOpportunities::Status).string().not_null())
                    .col(ColumnDef::new(RawOpportunities::RawPayload).json().not_null())
                    .col(ColumnDef::new(RawOpportunities::Title).string().not_null())
                    .col(ColumnDef::new(RawOpportunities::Company).string().not_null())
                    .col(ColumnDef::new(RawOpportunities::ApplyLink).string())
                    .col(ColumnDef::new(RawOpportunities::SuggestedType).string().not_null())
                    .col(ColumnDef::new(RawOpportunities::FresherScore).integer().not_null())
                    .col(ColumnDef::new(RawOpportunities::ReasonFlags).json().not_null())
                    .col(self.create_nullable_uuid_column(manager, RawOpportunities::MappedPostingId))
                    .col(ColumnDef::new(RawOpportunities::ErrorMessage).text())
                    .col(self.create_timestamp_column(manager, RawOpportunities::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_raw_opportunities_run_id")
                            .from(RawOpportunities::Table, RawOpportunities::RunId)
                            .to(IngestionRuns::Table, IngestionRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_postings_apply_link")
                    .table(Postings::Table)
                    .col(Postings::ApplyLink)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_postings_status_link_health")
                    .table(Postings::Table)
                    .col(Postings::Status)
                    .col(Postings::LinkHealth)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ingestion_runs_source_id")
                    .table(IngestionRuns::Table)
                    .col(IngestionRuns::SourceId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_raw_opportunities_run_id")
                    .table(RawOpportunities::Table)
                    .col(RawOpportunities::RunId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum IngestionSources {
    Table,
    Id,
    Name,
    Endpoint,
    SourceType,
    DefaultPostingType,
    RunFrequencyMinutes,
    Enabled,
    LastRunAt,
    LastSuccessAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Postings {
    Table,
    Id,
    Slug,
    PostingType,
    Status,
    Title,
    Company,
    Description,
    ApplyLink,
    Locations,
    WorkMode,
    ExperienceMin,
    ExperienceMax,
    AllowedPassoutYears,
    RequiredSkills,
    AllowedEducationLevels,
    ProvenanceNote,
    CreatedBy,
    LinkHealth,
    VerificationFailures,
    LastVerifiedAt,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IngestionRuns {
    Table,
    Id,
    SourceId,
    Status,
    StartedAt,
    FinishedAt,
    FetchedCount,
    DraftCreatedCount,
    DedupedCount,
    RejectedCount,
    ErrorCount,
    ErrorSummary,
}

#[derive(DeriveIden)]
enum RawOpportunities {
    Table,
    Id,
    SourceId,
    RunId,
    SourceExternalId,
    Status,
    RawPayload,
    Title,
    Company,
    ApplyLink,
    SuggestedType,
    FresherScore,
    ReasonFlags,
    MappedPostingId,
    ErrorMessage,
    CreatedAt,
}
