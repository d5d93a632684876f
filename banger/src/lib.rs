mod app;
pub mod cli;
pub mod loader;
pub mod logging;
pub mod social;

pub use app::App;
