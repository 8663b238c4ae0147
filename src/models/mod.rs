pub mod message;
pub mod outcome;
pub mod payload;
