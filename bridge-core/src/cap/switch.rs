use crate::model::{BasicState, Properties, Switched};

/// On/off as carried by `Status` or `BasicState`. When a fragment says both
/// "On" and "Off", "Off" wins.
pub fn on_state(props: &Properties) -> Option<bool> {
    let on = props.status == Some(Switched::On) || props.basic_state == Some(BasicState::On);
    let off = props.status == Some(Switched::Off) || props.basic_state == Some(BasicState::Off);
    match (on, off) {
        (_, true) => Some(false),
        (true, false) => Some(true),
        (false, false) => None,
    }
}
