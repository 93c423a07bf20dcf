//! Small formatting helpers for log output.

use std::time::Duration;

/// Formats a byte count as a human-readable size, e.g. "1.5 MB".
pub fn format_file_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PB")
}

/// Formats a duration as a human-readable string, e.g. "1m 30s".
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        return format!("{secs:.1}s");
    }

    let minutes = (secs / 60.0) as u64;
    let remaining = secs % 60.0;
    if minutes < 60 {
        return format!("{minutes}m {remaining:.0}s");
    }

    let hours = minutes / 60;
    format!("{}h {}m", hours, minutes % 60)
}
