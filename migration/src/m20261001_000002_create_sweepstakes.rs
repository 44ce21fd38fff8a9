use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

/// Sweepstakes (prize draws)
#[derive(DeriveIden)]
enum Sweepstakes {
    Table,
    Id,
    AdvertiserId,
    Title,
    Description,
    PrizeDetails,
    ImageUrl,
    StartDate,
    EndDate,
    PointsToEnter,
    NumberOfWinners,
    MaxParticipants,
    Status,
    IsDrawn,
    DrawDate,
    ParticipantCount,
    CreatedAt,
    UpdatedAt,
}

/// One row per entry
#[derive(DeriveIden)]
enum SweepstakeParticipants {
    Table,
    Id,
    SweepstakeId,
    UserId,
    Name,
    AvatarUrl,
    EntryDate,
}

/// Winners are keyed by (sweepstake_id, user_id)
#[derive(DeriveIden)]
enum SweepstakeWinners {
    Table,
    SweepstakeId,
    UserId,
    Position,
    Name,
    AvatarUrl,
    WonAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("sweepstake_status"))
                    .values(vec![
                        Alias::new("upcoming"),
                        Alias::new("active"),
                        Alias::new("ended"),
                        Alias::new("drawing_complete"),
                        Alias::new("cancelled"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sweepstakes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sweepstakes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::AdvertiserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Sweepstakes::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Sweepstakes::Description).text().not_null())
                    .col(ColumnDef::new(Sweepstakes::PrizeDetails).text().not_null())
                    .col(ColumnDef::new(Sweepstakes::ImageUrl).text().null())
                    .col(
                        ColumnDef::new(Sweepstakes::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::PointsToEnter)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::NumberOfWinners)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Sweepstakes::MaxParticipants).integer().null())
                    .col(
                        ColumnDef::new(Sweepstakes::Status)
                            .custom(Alias::new("sweepstake_status"))
                            .not_null()
                            .default(Expr::cust("'upcoming'::sweepstake_status")),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::IsDrawn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::DrawDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::ParticipantCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Sweepstakes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .check(Expr::col(Sweepstakes::EndDate).gte(Expr::col(Sweepstakes::StartDate)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sweepstakes_advertiser")
                            .from(Sweepstakes::Table, Sweepstakes::AdvertiserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sweepstakes_advertiser")
                    .table(Sweepstakes::Table)
                    .col(Sweepstakes::AdvertiserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SweepstakeParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SweepstakeParticipants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SweepstakeParticipants::SweepstakeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SweepstakeParticipants::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SweepstakeParticipants::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SweepstakeParticipants::AvatarUrl).text().null())
                    .col(
                        ColumnDef::new(SweepstakeParticipants::EntryDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sweepstake_participants_sweepstake")
                            .from(
                                SweepstakeParticipants::Table,
                                SweepstakeParticipants::SweepstakeId,
                            )
                            .to(Sweepstakes::Table, Sweepstakes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // not unique: multiple entries per user are a configuration choice
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sweepstake_participants_sweepstake_user")
                    .table(SweepstakeParticipants::Table)
                    .col(SweepstakeParticipants::SweepstakeId)
                    .col(SweepstakeParticipants::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SweepstakeWinners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SweepstakeWinners::SweepstakeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SweepstakeWinners::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SweepstakeWinners::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SweepstakeWinners::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SweepstakeWinners::AvatarUrl).text().null())
                    .col(
                        ColumnDef::new(SweepstakeWinners::WonAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_sweepstake_winners")
                            .col(SweepstakeWinners::SweepstakeId)
                            .col(SweepstakeWinners::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sweepstake_winners_sweepstake")
                            .from(SweepstakeWinners::Table, SweepstakeWinners::SweepstakeId)
                            .to(Sweepstakes::Table, Sweepstakes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // winners -> participants -> sweepstakes
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SweepstakeWinners::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SweepstakeParticipants::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Sweepstakes::Table).to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("sweepstake_status"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
