use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(string(Movie::Id).primary_key())
                    .col(string(Movie::Title))
                    .col(text(Movie::Overview))
                    .col(string_null(Movie::PosterPath))
                    .col(string_null(Movie::BackdropPath))
                    .col(json(Movie::Genres))
                    .col(json(Movie::Casts))
                    .col(string(Movie::ReleaseDate))
                    .col(string(Movie::OriginalLanguage))
                    .col(string(Movie::Tagline).default(""))
                    .col(double(Movie::VoteAverage))
                    .col(integer(Movie::Runtime))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Show::Table)
                    .if_not_exists()
                    .col(pk_auto(Show::Id))
                    .col(string(Show::MovieId))
                    .col(big_integer(Show::ShowDateTime))
                    .col(double(Show::ShowPrice))
                    .col(json(Show::OccupiedSeats))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_show_movie")
                            .from(Show::Table, Show::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_show_date_time")
                    .table(Show::Table)
                    .col(Show::ShowDateTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_show_movie_date_time")
                    .table(Show::Table)
                    .col(Show::MovieId)
                    .col(Show::ShowDateTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Show::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Overview,
    PosterPath,
    BackdropPath,
    Genres,
    Casts,
    ReleaseDate,
    OriginalLanguage,
    Tagline,
    VoteAverage,
    Runtime,
}

#[derive(DeriveIden)]
enum Show {
    Table,
    Id,
    MovieId,
    ShowDateTime,
    ShowPrice,
    OccupiedSeats,
}
