pub mod app;
pub mod config;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod source;
pub mod state;
pub mod summary;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use source::spawn_initial_load;
pub use state::AppState;
