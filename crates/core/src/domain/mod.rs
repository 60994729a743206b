pub mod message;
pub mod quote;
pub mod reply;
pub mod symbol;
