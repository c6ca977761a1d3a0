// Stores layer - Data access
pub mod role_store;
pub mod user_store;

pub use role_store::RoleStore;
pub use user_store::{ProfileUpdate, UserInsert, UserStore};
