pub mod dao;
pub mod db;
pub mod db_structs;
pub mod keys;
pub mod query;
pub mod store;
