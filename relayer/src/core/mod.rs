pub mod client;
pub mod contracts;
