pub mod db_service;
pub mod relationship_service;
pub mod search_service;
pub mod token_service;
pub mod user_service;
