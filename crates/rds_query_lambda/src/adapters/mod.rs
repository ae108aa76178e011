pub mod database;
pub mod mysql;
pub mod object_store;
pub mod secret_store;
