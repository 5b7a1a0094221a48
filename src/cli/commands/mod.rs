pub mod health;
pub mod postal;
pub mod token;
