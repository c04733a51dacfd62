use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::Title))
                    .col(text_null(Movies::Description))
                    .col(date_null(Movies::ReleaseDate))
                    .col(double_null(Movies::Rating))
                    .col(string_null(Movies::ImagePath))
                    .col(timestamp_with_time_zone(Movies::CreatedAt))
                    .col(timestamp_with_time_zone(Movies::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_title")
                    .table(Movies::Table)
                    .col(Movies::Title)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(pk_auto(Persons::Id))
                    .col(string(Persons::Name))
                    .col(string_uniq(Persons::Email))
                    .col(timestamp_with_time_zone(Persons::CreatedAt))
                    .col(timestamp_with_time_zone(Persons::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MoviePersons::Table)
                    .if_not_exists()
                    .col(pk_auto(MoviePersons::Id))
                    .col(integer(MoviePersons::MovieId))
                    .col(integer(MoviePersons::PersonId))
                    .col(string(MoviePersons::Role))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_persons_movie")
                            .from(MoviePersons::Table, MoviePersons::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_persons_person")
                            .from(MoviePersons::Table, MoviePersons::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_persons_unique")
                    .table(MoviePersons::Table)
                    .col(MoviePersons::MovieId)
                    .col(MoviePersons::PersonId)
                    .col(MoviePersons::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_persons_person")
                    .table(MoviePersons::Table)
                    .col(MoviePersons::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieGenres::Table)
                    .if_not_exists()
                    .col(integer(MovieGenres::MovieId))
                    .col(integer(MovieGenres::Genre))
                    .primary_key(
                        Index::create().col(MovieGenres::MovieId).col(MovieGenres::Genre),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genres_movie")
                            .from(MovieGenres::Table, MovieGenres::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_auto(Reviews::Id))
                    .col(integer(Reviews::MovieId))
                    .col(string(Reviews::AuthorName))
                    .col(double(Reviews::Rating))
                    .col(text(Reviews::Content))
                    .col(timestamp_with_time_zone(Reviews::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_movie")
                            .from(Reviews::Table, Reviews::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_movie")
                    .table(Reviews::Table)
                    .col(Reviews::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reviews::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieGenres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MoviePersons::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Persons::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    Description,
    ReleaseDate,
    Rating,
    ImagePath,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Persons {
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MoviePersons {
    Table,
    Id,
    MovieId,
    PersonId,
    Role,
}

#[derive(DeriveIden)]
enum MovieGenres {
    Table,
    MovieId,
    Genre,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    MovieId,
    AuthorName,
    Rating,
    Content,
    CreatedAt,
}
