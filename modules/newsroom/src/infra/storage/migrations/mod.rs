//! Database migrations for the newsroom

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_people::Migration),
            Box::new(m20250301_000002_create_taxonomy::Migration),
            Box::new(m20250301_000003_create_stories::Migration),
            Box::new(m20250301_000004_create_work::Migration),
            Box::new(m20250301_000005_create_radio::Migration),
            Box::new(m20250301_000006_create_notices::Migration),
        ]
    }
}

fn uuid_pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

mod m20250301_000001_create_people {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_people"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Stations::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Stations::Id))
                        .col(ColumnDef::new(Stations::Name).string().not_null())
                        .col(ColumnDef::new(Stations::Description).text())
                        .col(ColumnDef::new(Stations::Province).string().not_null())
                        .col(ColumnDef::new(Stations::ContactEmail).string())
                        .col(ColumnDef::new(Stations::ContactNumber).string())
                        .col(ColumnDef::new(Stations::Website).string())
                        .col(
                            ColumnDef::new(Stations::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Stations::HasContentAccess)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Stations::AllowedLanguages).json().not_null())
                        .col(ColumnDef::new(Stations::AllowedReligions).json().not_null())
                        .col(
                            ColumnDef::new(Stations::BlockedCategoryIds)
                                .json()
                                .not_null(),
                        )
                        .col(&mut timestamp(Stations::CreatedAt))
                        .col(&mut timestamp(Stations::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Users::Id))
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::FirstName).string().not_null())
                        .col(ColumnDef::new(Users::LastName).string().not_null())
                        .col(ColumnDef::new(Users::UserType).string().not_null())
                        .col(ColumnDef::new(Users::StaffRole).string())
                        .col(ColumnDef::new(Users::TranslationLanguage).string())
                        .col(ColumnDef::new(Users::RadioStationId).uuid())
                        .col(
                            ColumnDef::new(Users::IsPrimaryContact)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::MustChangePassword)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Users::LastLoginAt).timestamp_with_time_zone())
                        .col(&mut timestamp(Users::CreatedAt))
                        .col(&mut timestamp(Users::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_users_station")
                                .from(Users::Table, Users::RadioStationId)
                                .to(Stations::Table, Stations::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_users_station")
                        .table(Users::Table)
                        .col(Users::RadioStationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Sessions::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Sessions::Id))
                        .col(ColumnDef::new(Sessions::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(Sessions::TokenHash)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Sessions::UserAgent).string())
                        .col(
                            ColumnDef::new(Sessions::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(&mut timestamp(Sessions::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sessions_user")
                                .from(Sessions::Table, Sessions::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sessions_expires_at")
                        .table(Sessions::Table)
                        .col(Sessions::ExpiresAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PasswordResetTokens::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(PasswordResetTokens::Id))
                        .col(
                            ColumnDef::new(PasswordResetTokens::UserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::TokenHash)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PasswordResetTokens::UsedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(&mut timestamp(PasswordResetTokens::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_password_reset_tokens_user")
                                .from(PasswordResetTokens::Table, PasswordResetTokens::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PasswordResetTokens::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sessions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Stations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Stations {
        Table,
        Id,
        Name,
        Description,
        Province,
        ContactEmail,
        ContactNumber,
        Website,
        IsActive,
        HasContentAccess,
        AllowedLanguages,
        AllowedReligions,
        BlockedCategoryIds,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        FirstName,
        LastName,
        UserType,
        StaffRole,
        TranslationLanguage,
        RadioStationId,
        IsPrimaryContact,
        IsActive,
        MustChangePassword,
        LastLoginAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Sessions {
        Table,
        Id,
        UserId,
        TokenHash,
        UserAgent,
        ExpiresAt,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum PasswordResetTokens {
        Table,
        Id,
        UserId,
        TokenHash,
        ExpiresAt,
        UsedAt,
        CreatedAt,
    }
}

mod m20250301_000002_create_taxonomy {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_taxonomy"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Categories::Id))
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(
                            ColumnDef::new(Categories::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Categories::Description).text())
                        .col(ColumnDef::new(Categories::ParentId).uuid())
                        .col(
                            ColumnDef::new(Categories::Level)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(&mut timestamp(Categories::CreatedAt))
                        .col(&mut timestamp(Categories::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_categories_parent")
                                .from(Categories::Table, Categories::ParentId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Classifications::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Classifications::Id))
                        .col(ColumnDef::new(Classifications::Name).string().not_null())
                        .col(
                            ColumnDef::new(Classifications::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Classifications::Kind).string().not_null())
                        .col(ColumnDef::new(Classifications::Description).text())
                        .col(
                            ColumnDef::new(Classifications::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Classifications::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(&mut timestamp(Classifications::CreatedAt))
                        .col(&mut timestamp(Classifications::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_classifications_kind")
                        .table(Classifications::Table)
                        .col(Classifications::Kind)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Tags::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Tags::Id))
                        .col(ColumnDef::new(Tags::Name).string().not_null())
                        .col(ColumnDef::new(Tags::Slug).string().not_null().unique_key())
                        .col(&mut timestamp(Tags::CreatedAt))
                        .col(&mut timestamp(Tags::UpdatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tags::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Classifications::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
        Name,
        Slug,
        Description,
        ParentId,
        Level,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Classifications {
        Table,
        Id,
        Name,
        Slug,
        Kind,
        Description,
        IsActive,
        SortOrder,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Tags {
        Table,
        Id,
        Name,
        Slug,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_stories {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_stories"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Stories::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Stories::Id))
                        .col(ColumnDef::new(Stories::Title).string().not_null())
                        .col(
                            ColumnDef::new(Stories::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Stories::Content).text().not_null())
                        .col(ColumnDef::new(Stories::Summary).text())
                        .col(ColumnDef::new(Stories::Status).string().not_null())
                        .col(ColumnDef::new(Stories::AuthorId).uuid().not_null())
                        .col(ColumnDef::new(Stories::ReviewerId).uuid())
                        .col(ColumnDef::new(Stories::ApproverId).uuid())
                        .col(ColumnDef::new(Stories::PublisherId).uuid())
                        .col(ColumnDef::new(Stories::CategoryId).uuid())
                        .col(ColumnDef::new(Stories::OriginalStoryId).uuid())
                        .col(ColumnDef::new(Stories::PublishedAt).timestamp_with_time_zone())
                        .col(&mut timestamp(Stories::CreatedAt))
                        .col(&mut timestamp(Stories::UpdatedAt))
                        .col(ColumnDef::new(Stories::DeletedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stories_author")
                                .from(Stories::Table, Stories::AuthorId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stories_category")
                                .from(Stories::Table, Stories::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stories_original")
                                .from(Stories::Table, Stories::OriginalStoryId)
                                .to(Stories::Table, Stories::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, col) in [
                ("idx_stories_status", Stories::Status),
                ("idx_stories_author", Stories::AuthorId),
                ("idx_stories_original", Stories::OriginalStoryId),
                ("idx_stories_published_at", Stories::PublishedAt),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .name(name)
                            .table(Stories::Table)
                            .col(col)
                            .to_owned(),
                    )
                    .await?;
            }

            manager
                .create_table(
                    Table::create()
                        .table(StoryClassifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StoryClassifications::StoryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoryClassifications::ClassificationId)
                                .uuid()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(StoryClassifications::StoryId)
                                .col(StoryClassifications::ClassificationId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_story_classifications_story")
                                .from(StoryClassifications::Table, StoryClassifications::StoryId)
                                .to(Stories::Table, Stories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_story_classifications_classification")
                                .from(
                                    StoryClassifications::Table,
                                    StoryClassifications::ClassificationId,
                                )
                                .to(Classifications::Table, Classifications::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StoryTags::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(StoryTags::StoryId).uuid().not_null())
                        .col(ColumnDef::new(StoryTags::TagId).uuid().not_null())
                        .primary_key(
                            Index::create()
                                .col(StoryTags::StoryId)
                                .col(StoryTags::TagId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_story_tags_story")
                                .from(StoryTags::Table, StoryTags::StoryId)
                                .to(Stories::Table, Stories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_story_tags_tag")
                                .from(StoryTags::Table, StoryTags::TagId)
                                .to(Tags::Table, Tags::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AudioClips::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(AudioClips::Id))
                        .col(ColumnDef::new(AudioClips::StoryId).uuid().not_null())
                        .col(ColumnDef::new(AudioClips::Url).string().not_null())
                        .col(ColumnDef::new(AudioClips::Pathname).string().not_null())
                        .col(ColumnDef::new(AudioClips::FileName).string().not_null())
                        .col(ColumnDef::new(AudioClips::MimeType).string().not_null())
                        .col(ColumnDef::new(AudioClips::FileSize).big_integer().not_null())
                        .col(ColumnDef::new(AudioClips::UploadedBy).uuid().not_null())
                        .col(&mut timestamp(AudioClips::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_audio_clips_story")
                                .from(AudioClips::Table, AudioClips::StoryId)
                                .to(Stories::Table, Stories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Comments::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Comments::Id))
                        .col(ColumnDef::new(Comments::StoryId).uuid().not_null())
                        .col(ColumnDef::new(Comments::AuthorId).uuid().not_null())
                        .col(ColumnDef::new(Comments::ParentId).uuid())
                        .col(ColumnDef::new(Comments::Content).text().not_null())
                        .col(ColumnDef::new(Comments::CommentType).string().not_null())
                        .col(
                            ColumnDef::new(Comments::IsResolved)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Comments::ResolvedBy).uuid())
                        .col(ColumnDef::new(Comments::ResolvedAt).timestamp_with_time_zone())
                        .col(&mut timestamp(Comments::CreatedAt))
                        .col(&mut timestamp(Comments::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_comments_story")
                                .from(Comments::Table, Comments::StoryId)
                                .to(Stories::Table, Stories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_comments_parent")
                                .from(Comments::Table, Comments::ParentId)
                                .to(Comments::Table, Comments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_comments_story")
                        .table(Comments::Table)
                        .col(Comments::StoryId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Comments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AudioClips::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StoryTags::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StoryClassifications::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Stories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Stories {
        Table,
        Id,
        Title,
        Slug,
        Content,
        Summary,
        Status,
        AuthorId,
        ReviewerId,
        ApproverId,
        PublisherId,
        CategoryId,
        OriginalStoryId,
        PublishedAt,
        CreatedAt,
        UpdatedAt,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum StoryClassifications {
        Table,
        StoryId,
        ClassificationId,
    }

    #[derive(DeriveIden)]
    enum StoryTags {
        Table,
        StoryId,
        TagId,
    }

    #[derive(DeriveIden)]
    enum AudioClips {
        Table,
        Id,
        StoryId,
        Url,
        Pathname,
        FileName,
        MimeType,
        FileSize,
        UploadedBy,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Comments {
        Table,
        Id,
        StoryId,
        AuthorId,
        ParentId,
        Content,
        CommentType,
        IsResolved,
        ResolvedBy,
        ResolvedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Classifications {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Tags {
        Table,
        Id,
    }
}

mod m20250301_000004_create_work {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_work"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tasks::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Tasks::Id))
                        .col(ColumnDef::new(Tasks::Title).string().not_null())
                        .col(ColumnDef::new(Tasks::Description).text())
                        .col(ColumnDef::new(Tasks::TaskType).string().not_null())
                        .col(ColumnDef::new(Tasks::Status).string().not_null())
                        .col(ColumnDef::new(Tasks::Priority).string().not_null())
                        .col(ColumnDef::new(Tasks::PriorityRank).integer().not_null())
                        .col(ColumnDef::new(Tasks::AssignedToId).uuid().not_null())
                        .col(ColumnDef::new(Tasks::CreatedById).uuid().not_null())
                        .col(ColumnDef::new(Tasks::StoryId).uuid())
                        .col(ColumnDef::new(Tasks::DueDate).timestamp_with_time_zone())
                        .col(ColumnDef::new(Tasks::CompletedAt).timestamp_with_time_zone())
                        .col(&mut timestamp(Tasks::CreatedAt))
                        .col(&mut timestamp(Tasks::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tasks_assignee")
                                .from(Tasks::Table, Tasks::AssignedToId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tasks_story")
                                .from(Tasks::Table, Tasks::StoryId)
                                .to(Stories::Table, Stories::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_tasks_assignee_status")
                        .table(Tasks::Table)
                        .col(Tasks::AssignedToId)
                        .col(Tasks::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DiaryEntries::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(DiaryEntries::Id))
                        .col(ColumnDef::new(DiaryEntries::Title).string().not_null())
                        .col(ColumnDef::new(DiaryEntries::Notes).text())
                        .col(
                            ColumnDef::new(DiaryEntries::DateTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DiaryEntries::StoryId).uuid())
                        .col(ColumnDef::new(DiaryEntries::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(DiaryEntries::IsCompleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(&mut timestamp(DiaryEntries::CreatedAt))
                        .col(&mut timestamp(DiaryEntries::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_diary_entries_story")
                                .from(DiaryEntries::Table, DiaryEntries::StoryId)
                                .to(Stories::Table, Stories::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_diary_entries_date_time")
                        .table(DiaryEntries::Table)
                        .col(DiaryEntries::DateTime)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DiaryAssignees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DiaryAssignees::DiaryEntryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DiaryAssignees::UserId).uuid().not_null())
                        .primary_key(
                            Index::create()
                                .col(DiaryAssignees::DiaryEntryId)
                                .col(DiaryAssignees::UserId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_diary_assignees_entry")
                                .from(DiaryAssignees::Table, DiaryAssignees::DiaryEntryId)
                                .to(DiaryEntries::Table, DiaryEntries::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_diary_assignees_user")
                                .from(DiaryAssignees::Table, DiaryAssignees::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DiaryAssignees::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DiaryEntries::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tasks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tasks {
        Table,
        Id,
        Title,
        Description,
        TaskType,
        Status,
        Priority,
        PriorityRank,
        AssignedToId,
        CreatedById,
        StoryId,
        DueDate,
        CompletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DiaryEntries {
        Table,
        Id,
        Title,
        Notes,
        DateTime,
        StoryId,
        CreatedBy,
        IsCompleted,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DiaryAssignees {
        Table,
        DiaryEntryId,
        UserId,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Stories {
        Table,
        Id,
    }
}

mod m20250301_000005_create_radio {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_radio"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shows::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Shows::Id))
                        .col(ColumnDef::new(Shows::Title).string().not_null())
                        .col(ColumnDef::new(Shows::Slug).string().not_null().unique_key())
                        .col(ColumnDef::new(Shows::Description).text())
                        .col(ColumnDef::new(Shows::CategoryId).uuid())
                        .col(ColumnDef::new(Shows::CoverImageUrl).string())
                        .col(
                            ColumnDef::new(Shows::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Shows::CreatedBy).uuid().not_null())
                        .col(&mut timestamp(Shows::CreatedAt))
                        .col(&mut timestamp(Shows::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shows_category")
                                .from(Shows::Table, Shows::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Episodes::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Episodes::Id))
                        .col(ColumnDef::new(Episodes::ShowId).uuid().not_null())
                        .col(ColumnDef::new(Episodes::Title).string().not_null())
                        .col(ColumnDef::new(Episodes::Slug).string().not_null())
                        .col(ColumnDef::new(Episodes::Description).text())
                        .col(ColumnDef::new(Episodes::EpisodeNumber).integer().not_null())
                        .col(ColumnDef::new(Episodes::Status).string().not_null())
                        .col(ColumnDef::new(Episodes::AudioUrl).string())
                        .col(ColumnDef::new(Episodes::AudioPathname).string())
                        .col(ColumnDef::new(Episodes::FileSize).big_integer())
                        .col(ColumnDef::new(Episodes::DurationSeconds).integer())
                        .col(ColumnDef::new(Episodes::PublishedAt).timestamp_with_time_zone())
                        .col(ColumnDef::new(Episodes::CreatedBy).uuid().not_null())
                        .col(&mut timestamp(Episodes::CreatedAt))
                        .col(&mut timestamp(Episodes::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_episodes_show")
                                .from(Episodes::Table, Episodes::ShowId)
                                .to(Shows::Table, Shows::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_episodes_show_slug")
                        .table(Episodes::Table)
                        .col(Episodes::ShowId)
                        .col(Episodes::Slug)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Bulletins::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Bulletins::Id))
                        .col(ColumnDef::new(Bulletins::Title).string().not_null())
                        .col(
                            ColumnDef::new(Bulletins::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Bulletins::Intro).text())
                        .col(ColumnDef::new(Bulletins::Outro).text())
                        .col(ColumnDef::new(Bulletins::LanguageId).uuid().not_null())
                        .col(ColumnDef::new(Bulletins::Status).string().not_null())
                        .col(
                            ColumnDef::new(Bulletins::ScheduledFor)
                                .timestamp_with_time_zone(),
                        )
                        .col(ColumnDef::new(Bulletins::AuthorId).uuid().not_null())
                        .col(ColumnDef::new(Bulletins::ReviewerId).uuid())
                        .col(ColumnDef::new(Bulletins::PublishedAt).timestamp_with_time_zone())
                        .col(&mut timestamp(Bulletins::CreatedAt))
                        .col(&mut timestamp(Bulletins::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bulletins_language")
                                .from(Bulletins::Table, Bulletins::LanguageId)
                                .to(Classifications::Table, Classifications::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BulletinStories::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(BulletinStories::BulletinId).uuid().not_null())
                        .col(ColumnDef::new(BulletinStories::StoryId).uuid().not_null())
                        .col(ColumnDef::new(BulletinStories::Position).integer().not_null())
                        .primary_key(
                            Index::create()
                                .col(BulletinStories::BulletinId)
                                .col(BulletinStories::StoryId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bulletin_stories_bulletin")
                                .from(BulletinStories::Table, BulletinStories::BulletinId)
                                .to(Bulletins::Table, Bulletins::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bulletin_stories_story")
                                .from(BulletinStories::Table, BulletinStories::StoryId)
                                .to(Stories::Table, Stories::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BulletinStories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Bulletins::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Episodes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Shows::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Shows {
        Table,
        Id,
        Title,
        Slug,
        Description,
        CategoryId,
        CoverImageUrl,
        IsActive,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Episodes {
        Table,
        Id,
        ShowId,
        Title,
        Slug,
        Description,
        EpisodeNumber,
        Status,
        AudioUrl,
        AudioPathname,
        FileSize,
        DurationSeconds,
        PublishedAt,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Bulletins {
        Table,
        Id,
        Title,
        Slug,
        Intro,
        Outro,
        LanguageId,
        Status,
        ScheduledFor,
        AuthorId,
        ReviewerId,
        PublishedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum BulletinStories {
        Table,
        BulletinId,
        StoryId,
        Position,
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Classifications {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Stories {
        Table,
        Id,
    }
}

mod m20250301_000006_create_notices {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000006_create_notices"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Announcements::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(Announcements::Id))
                        .col(ColumnDef::new(Announcements::Title).string().not_null())
                        .col(ColumnDef::new(Announcements::Message).text().not_null())
                        .col(ColumnDef::new(Announcements::Priority).string().not_null())
                        .col(ColumnDef::new(Announcements::Target).string().not_null())
                        .col(
                            ColumnDef::new(Announcements::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Announcements::ExpiresAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(ColumnDef::new(Announcements::AuthorId).uuid().not_null())
                        .col(&mut timestamp(Announcements::CreatedAt))
                        .col(&mut timestamp(Announcements::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AnnouncementDismissals::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AnnouncementDismissals::AnnouncementId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AnnouncementDismissals::UserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(&mut timestamp(AnnouncementDismissals::DismissedAt))
                        .primary_key(
                            Index::create()
                                .col(AnnouncementDismissals::AnnouncementId)
                                .col(AnnouncementDismissals::UserId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_announcement_dismissals_announcement")
                                .from(
                                    AnnouncementDismissals::Table,
                                    AnnouncementDismissals::AnnouncementId,
                                )
                                .to(Announcements::Table, Announcements::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditLogs::Table)
                        .if_not_exists()
                        .col(&mut uuid_pk(AuditLogs::Id))
                        .col(ColumnDef::new(AuditLogs::UserId).uuid())
                        .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                        .col(ColumnDef::new(AuditLogs::EntityType).string().not_null())
                        .col(ColumnDef::new(AuditLogs::EntityId).string())
                        .col(ColumnDef::new(AuditLogs::Details).json().not_null())
                        .col(&mut timestamp(AuditLogs::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_audit_logs_entity")
                        .table(AuditLogs::Table)
                        .col(AuditLogs::EntityType)
                        .col(AuditLogs::EntityId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_audit_logs_created_at")
                        .table(AuditLogs::Table)
                        .col(AuditLogs::CreatedAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AnnouncementDismissals::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Announcements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Announcements {
        Table,
        Id,
        Title,
        Message,
        Priority,
        Target,
        IsActive,
        ExpiresAt,
        AuthorId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum AnnouncementDismissals {
        Table,
        AnnouncementId,
        UserId,
        DismissedAt,
    }

    #[derive(DeriveIden)]
    enum AuditLogs {
        Table,
        Id,
        UserId,
        Action,
        EntityType,
        EntityId,
        Details,
        CreatedAt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database};

    #[tokio::test]
    async fn fresh_database_applies_every_migration_once() {
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).min_connections(1);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let applied = Migrator::get_applied_migrations(&db).await.unwrap();
        let mut versions: Vec<String> = applied.iter().map(|m| m.name().to_owned()).collect();
        assert_eq!(versions.len(), 6);
        versions.sort();
        versions.dedup();
        assert_eq!(versions.len(), 6);
        assert_eq!(versions[0], "m20250301_000001_create_people");
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
    }
}
