pub mod asset;
pub mod asset_transaction;
pub mod category;
pub mod location;
pub mod role;
pub mod role_permission;
pub mod user;
