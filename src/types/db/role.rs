use sea_orm::entity::prelude::*;

use crate::types::internal::permission::{Permission, PermissionSet};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    /// Sum of distinct `Permission` bits
    pub permissions: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_bits(self.permissions)
    }

    pub fn has_permission(&self, perm: Permission) -> bool {
        self.permission_set().contains(perm)
    }
}
