pub mod connection;
pub mod property;
pub mod property_use;
