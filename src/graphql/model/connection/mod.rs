pub mod base_connection;
pub mod page_info;
pub mod property_connection;
pub mod property_use_connection;
