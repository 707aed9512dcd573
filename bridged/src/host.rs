use bridge_core::host::{Accessory, HostRuntime};
use tracing::info;

/// Host runtime for the standalone daemon: registration is logged and the
/// accessories are served over HTTP.
#[derive(Debug, Default)]
pub struct LoggingHost;

impl HostRuntime for LoggingHost {
    fn register_accessories(&mut self, accessories: &[Accessory]) {
        for a in accessories {
            let kinds: Vec<_> = a.services.iter().map(|s| s.kind()).collect();
            info!(uuid = %a.uuid, name = %a.name, services = ?kinds, "accessory registered");
        }
    }

    fn unregister_accessories(&mut self, accessories: &[Accessory]) {
        for a in accessories {
            info!(uuid = %a.uuid, name = %a.name, "accessory unregistered");
        }
    }
}
