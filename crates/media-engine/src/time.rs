//! Clock labels for the player

/// Formats seconds as `m:ss`
///
/// Minutes are unpadded, seconds zero-padded to two digits, and fractions
/// truncated rather than rounded. Negative or non-finite input reads as
/// `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(9.0), "0:09");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(600.0), "10:00");
    }

    #[test]
    fn test_fractions_truncate() {
        assert_eq!(format_time(59.999), "0:59");
        assert_eq!(format_time(119.5), "1:59");
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }
}
