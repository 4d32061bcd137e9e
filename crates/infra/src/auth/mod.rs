pub mod token;

pub use token::{Identity, TokenError, TokenKeys, ROLE_AGENT};
