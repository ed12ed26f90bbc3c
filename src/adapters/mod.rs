pub mod http;
pub mod identity;
pub mod persistence;
