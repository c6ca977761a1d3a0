pub mod permission;
pub mod principal;
pub mod token;
