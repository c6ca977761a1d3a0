pub use sea_orm_migration::prelude::*;

mod m20230611_000001_create_roles_and_users;
mod m20230611_000002_add_user_confirmed;
mod m20230615_000001_add_user_profile;

pub struct IdentityMigrator;

#[async_trait::async_trait]
impl MigratorTrait for IdentityMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20230611_000001_create_roles_and_users::Migration),
            Box::new(m20230611_000002_add_user_confirmed::Migration),
            Box::new(m20230615_000001_add_user_profile::Migration),
        ]
    }
}
