use std::sync::Arc;

use finder_client::LocationClient;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    /// Cached, retrying client of the location-data backend
    pub client: Arc<LocationClient>,
    pub config: Arc<Config>,
}
