pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod ranks;
pub mod rollover;
pub mod stats;
pub mod storage;
pub mod tasks;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Config;
pub use rollover::{spawn_rollover_ticker, Clock, LocalClock, ManualClock};
pub use state::AppState;
pub use storage::{load_data, persist_data};
