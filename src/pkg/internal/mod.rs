pub mod adaptors;
pub mod auth;
pub mod blob;
pub mod form;
pub mod reconcile;
pub mod schema;
pub mod store;
