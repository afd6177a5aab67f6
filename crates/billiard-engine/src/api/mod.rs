pub mod events;
pub mod table;
pub mod types;
