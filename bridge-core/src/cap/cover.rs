use crate::error::FieldError;

pub const POSITION_STATE_DECREASING: i64 = 0;
pub const POSITION_STATE_INCREASING: i64 = 1;
pub const POSITION_STATE_STOPPED: i64 = 2;

// Direction is unknown; a moving cover reads as increasing.
pub fn position_state(moving: bool) -> i64 {
    if moving { POSITION_STATE_INCREASING } else { POSITION_STATE_STOPPED }
}

pub fn parse_position(raw: &str) -> Result<i64, FieldError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
        .ok_or_else(|| FieldError::InvalidNumber { field: "Position", value: raw.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_and_fractional_positions() {
        assert_eq!(parse_position("45"), Ok(45));
        assert_eq!(parse_position(" 45.7 "), Ok(45));
        assert!(parse_position("half").is_err());
    }
}
