// Duration formatting and serialization helpers

use chrono::Duration;

/// Duration as fractional days
pub fn as_days_f64(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 86_400_000.0
}

/// Format a duration for display (e.g., "3d 4h", "5h 20m", "45m")
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.abs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{}{}d {}h", sign, days, hours)
    } else if hours > 0 {
        format!("{}{}h {}m", sign, hours, minutes)
    } else {
        format!("{}{}m", sign, minutes)
    }
}

/// Serialize `Option<Duration>` as whole seconds (null when absent)
pub mod serde_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let secs: Option<i64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::seconds))
    }
}
