//! Timestamp helpers shared by the relay server and its tests

use chrono::Local;

/// Format the current local time as the wire timestamp for a chat message
///
/// Clients display this string verbatim, so it is a time of day rather than
/// an epoch value.
pub fn message_timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Get current Unix timestamp in seconds
///
/// Used for `joined_at` on registered identities. Saturates to zero if the
/// system clock reads before the Unix epoch.
pub fn unix_timestamp() -> i64 {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_timestamp_format() {
        let stamp = message_timestamp();
        // HH:MM:SS
        assert_eq!(stamp.len(), 8);
        let parts: Vec<&str> = stamp.split(':').collect();
        assert_eq!(parts.len(), 3);
        for part in parts {
            assert_eq!(part.len(), 2);
            part.parse::<u8>().expect("timestamp parts are numeric");
        }
    }

    #[test]
    fn test_unix_timestamp_is_recent() {
        // Any date after 2024-01-01
        assert!(unix_timestamp() > 1_704_067_200);
    }
}
