pub mod auth;
pub mod cache;
pub mod errors;
pub mod response;
