use crate::model::FanSpeed;

/// The hub has no fan "off" command; `Low` stands in for it.
pub const OFF_PROXY: FanSpeed = FanSpeed::Low;

// Not the inverse of speed_for_rotation: High reads as 66, writes from 50.
pub fn rotation_for_speed(speed: FanSpeed) -> Option<(i64, bool)> {
    match speed {
        FanSpeed::Boost => Some((100, true)),
        FanSpeed::High => Some((66, true)),
        FanSpeed::Medium => Some((33, true)),
        FanSpeed::Low => Some((0, false)),
        FanSpeed::Unknown => None,
    }
}

pub fn speed_for_rotation(value: f64) -> FanSpeed {
    if value == 100.0 {
        FanSpeed::Boost
    } else if value >= 50.0 {
        FanSpeed::High
    } else if value == 0.0 {
        FanSpeed::Low
    } else {
        FanSpeed::Medium
    }
}
