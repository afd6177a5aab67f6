pub mod groups;
pub mod rack;
pub mod turn;
