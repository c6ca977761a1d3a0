use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// SQLite only accepts one column per ALTER TABLE statement.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let columns = [
            ColumnDef::new(Users::Name).string_len(64).null().to_owned(),
            ColumnDef::new(Users::Location).string_len(64).null().to_owned(),
            ColumnDef::new(Users::AboutMe).text().null().to_owned(),
            ColumnDef::new(Users::MemberSince).big_integer().null().to_owned(),
            ColumnDef::new(Users::LastSeen).big_integer().null().to_owned(),
        ];

        for mut column in columns {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .add_column(&mut column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for column in [
            Users::LastSeen,
            Users::MemberSince,
            Users::AboutMe,
            Users::Location,
            Users::Name,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(Users::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Name,
    Location,
    AboutMe,
    MemberSince,
    LastSeen,
}
