use crate::config::AuthConfig;
use bridge_engine::runtime::BridgeHandle;

#[derive(Clone)]
pub struct AppState {
    pub bridge: BridgeHandle,
    pub auth: AuthConfig,
}
