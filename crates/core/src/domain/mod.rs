pub mod criteria;
pub mod listing;
pub mod search;
