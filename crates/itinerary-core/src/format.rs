//! Human-readable length/duration text for route steps and summaries.

/// Format a length (km) and duration (s) the way the route bubbles show it,
/// e.g. `"12.3 km, 1 h 2 min"` or `"250 m, 42 s"`.
pub fn length_duration_text(length_km: f64, duration_s: f64) -> String {
    let mut text = if length_km >= 100.0 {
        format!("{:.0} km, ", length_km)
    } else if length_km >= 1.0 {
        format!("{:.1} km, ", length_km)
    } else {
        format!("{:.0} m, ", length_km * 1000.0)
    };

    let total_secs = if duration_s.is_finite() && duration_s > 0.0 {
        duration_s as u64
    } else {
        0
    };
    let hours = total_secs / 3600;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;

    if hours != 0 {
        text.push_str(&format!("{} h ", hours));
    }
    if minutes != 0 {
        text.push_str(&format!("{} min", minutes));
    }
    if hours == 0 && minutes == 0 {
        text.push_str(&format!("{} s", seconds));
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_steps_use_meters_and_seconds() {
        assert_eq!(length_duration_text(0.25, 42.0), "250 m, 42 s");
    }

    #[test]
    fn medium_steps_keep_one_decimal() {
        assert_eq!(length_duration_text(12.34, 3725.0), "12.3 km, 1 h 2 min");
    }

    #[test]
    fn long_routes_round_to_whole_kilometers() {
        assert_eq!(length_duration_text(150.4, 7200.0), "150 km, 2 h");
    }

    #[test]
    fn seconds_are_hidden_once_minutes_are_shown() {
        assert_eq!(length_duration_text(1.0, 61.0), "1.0 km, 1 min");
    }

    #[test]
    fn negative_duration_is_zero() {
        assert_eq!(length_duration_text(0.0, -5.0), "0 m, 0 s");
    }
}
