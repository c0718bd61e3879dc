pub mod aggregate;
pub mod app;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod quality;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Settings;
pub use models::Dataset;
pub use state::AppState;
pub use storage::load_dataset;
