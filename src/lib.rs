pub mod app;
pub mod error;
pub mod handlers;
pub mod message;
pub mod models;
pub mod operations;
pub mod ui;

pub use app::App;
pub use error::{Error, Result};
pub use operations::run_app;
