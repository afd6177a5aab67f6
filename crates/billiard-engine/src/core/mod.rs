#[cfg(feature = "physics")]
pub mod physics;
pub mod runner;
#[cfg(feature = "physics")]
pub mod sim_table;
pub mod time;
