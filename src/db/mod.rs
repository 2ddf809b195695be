pub mod db_utils;
pub mod defaults;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod records;
pub mod stats;
pub mod stores;
pub mod users;
