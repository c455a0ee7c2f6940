pub mod asset;
pub mod catalog;
pub mod scenario;
pub mod source;
pub mod target;
pub mod validate;
