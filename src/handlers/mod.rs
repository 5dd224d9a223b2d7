// Handlers module
pub mod auth;
pub mod health;
pub mod keys;
pub mod metrics;
pub mod users;
