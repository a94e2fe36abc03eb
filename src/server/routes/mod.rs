pub mod generate;
pub mod health;
