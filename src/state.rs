use crate::models::AppData;
use crate::rollover::Clock;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, clock: Arc<dyn Clock>) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            clock,
        }
    }
}
