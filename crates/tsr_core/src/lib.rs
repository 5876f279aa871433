pub mod analytics;
pub mod chain;
pub mod db;
pub mod demo;
pub mod domain;
pub mod emergency;
pub mod error;
pub mod evidence;
pub mod lifecycle;
pub mod store;
pub mod validate;
