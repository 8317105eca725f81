pub mod action;
pub mod error;
pub mod executor;
pub mod io;
pub mod milestone;
pub mod paths;
pub mod presentation;
pub mod session;

pub use error::{ForemanError, Result};
