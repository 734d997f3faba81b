pub mod db;
pub mod domain;
pub mod stores;

pub use stores::PgStore;
