pub mod bus;
mod error;
pub mod event;
pub mod service;

pub use error::RequestError;
