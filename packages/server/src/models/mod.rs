pub mod asset;
pub mod auth;
pub mod category;
pub mod dashboard;
pub mod location;
pub mod shared;
pub mod transaction;
pub mod user;
