//! Initial schema: organization directory, question set and status records

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create users table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Name, 255).not_null())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::Role, 32).not_null().default("employee"))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create projects and project_managers tables
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(string_len(Project::Name, 255).not_null().unique_key())
                    .col(
                        timestamp_with_time_zone(Project::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectManager::Table)
                    .if_not_exists()
                    .col(uuid(ProjectManager::ProjectId).not_null())
                    .col(uuid(ProjectManager::UserId).not_null())
                    .primary_key(
                        Index::create()
                            .col(ProjectManager::ProjectId)
                            .col(ProjectManager::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_managers_project_id")
                            .from(ProjectManager::Table, ProjectManager::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_managers_user_id")
                            .from(ProjectManager::Table, ProjectManager::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_managers_user_id")
                    .table(ProjectManager::Table)
                    .col(ProjectManager::UserId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create teams and team_members tables
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(uuid(Team::Id).primary_key())
                    .col(string_len(Team::Name, 255).not_null().unique_key())
                    .col(uuid_null(Team::ProjectId))
                    .col(
                        timestamp_with_time_zone(Team::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_project_id")
                            .from(Team::Table, Team::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_project_id")
                    .table(Team::Table)
                    .col(Team::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMember::Table)
                    .if_not_exists()
                    .col(uuid(TeamMember::TeamId).not_null())
                    .col(uuid(TeamMember::UserId).not_null())
                    .col(
                        timestamp_with_time_zone(TeamMember::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(TeamMember::TeamId)
                            .col(TeamMember::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team_id")
                            .from(TeamMember::Table, TeamMember::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_user_id")
                            .from(TeamMember::Table, TeamMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_user_id")
                    .table(TeamMember::Table)
                    .col(TeamMember::UserId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Create questions and question_teams tables
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(uuid(Question::Id).primary_key())
                    .col(text(Question::Text).not_null())
                    .col(boolean(Question::IsCommon).not_null().default(false))
                    .col(integer(Question::DisplayOrder).not_null().default(0))
                    .col(boolean(Question::IsActive).not_null().default(true))
                    .col(uuid_null(Question::CreatedBy))
                    .col(
                        timestamp_with_time_zone(Question::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Question::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuestionTeam::Table)
                    .if_not_exists()
                    .col(uuid(QuestionTeam::QuestionId).not_null())
                    .col(uuid(QuestionTeam::TeamId).not_null())
                    .primary_key(
                        Index::create()
                            .col(QuestionTeam::QuestionId)
                            .col(QuestionTeam::TeamId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_teams_question_id")
                            .from(QuestionTeam::Table, QuestionTeam::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_teams_team_id")
                            .from(QuestionTeam::Table, QuestionTeam::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Create status_records table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(StatusRecord::Table)
                    .if_not_exists()
                    .col(uuid(StatusRecord::Id).primary_key())
                    .col(uuid(StatusRecord::TeamId).not_null())
                    .col(uuid(StatusRecord::UserId).not_null())
                    .col(date(StatusRecord::Date).not_null())
                    .col(boolean(StatusRecord::IsLeave).not_null().default(false))
                    .col(text_null(StatusRecord::LeaveReason))
                    .col(text(StatusRecord::Responses).not_null())
                    .col(uuid(StatusRecord::SubmittedBy).not_null())
                    .col(timestamp_with_time_zone(StatusRecord::SubmittedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_records_team_id")
                            .from(StatusRecord::Table, StatusRecord::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_records_user_id")
                            .from(StatusRecord::Table, StatusRecord::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(StatusRecord::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(QuestionTeam::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TeamMember::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ProjectManager::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Name,
    Email,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Project {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProjectManager {
    #[sea_orm(iden = "project_managers")]
    Table,
    ProjectId,
    UserId,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    Name,
    ProjectId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TeamMember {
    #[sea_orm(iden = "team_members")]
    Table,
    TeamId,
    UserId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Question {
    #[sea_orm(iden = "questions")]
    Table,
    Id,
    Text,
    IsCommon,
    DisplayOrder,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum QuestionTeam {
    #[sea_orm(iden = "question_teams")]
    Table,
    QuestionId,
    TeamId,
}

#[derive(DeriveIden)]
enum StatusRecord {
    #[sea_orm(iden = "status_records")]
    Table,
    Id,
    TeamId,
    UserId,
    Date,
    IsLeave,
    LeaveReason,
    Responses,
    SubmittedBy,
    SubmittedAt,
}
