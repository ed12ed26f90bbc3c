pub mod access_registry;
pub mod identity_link;
