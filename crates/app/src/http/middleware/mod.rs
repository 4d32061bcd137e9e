pub mod auth;
pub mod query_limit;
