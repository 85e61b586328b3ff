//! Human-readable size helpers shared by the API summaries and the CLI.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count with binary (1024) steps and at most two decimals.
///
/// `0` formats as `"0 Bytes"`, `1536` as `"1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}

/// Rounded percentage change from `original` to `processed`.
///
/// Returns `None` when the original is empty.
pub fn size_change_percent(original: u64, processed: u64) -> Option<i64> {
    if original == 0 {
        return None;
    }
    let change = (processed as f64 - original as f64) / original as f64 * 100.0;
    Some(change.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_format_bytes_caps_at_gigabytes() {
        assert_eq!(format_bytes(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_size_change_percent() {
        assert_eq!(size_change_percent(200, 50), Some(-75));
        assert_eq!(size_change_percent(100, 150), Some(50));
        assert_eq!(size_change_percent(3, 2), Some(-33));
        assert_eq!(size_change_percent(0, 10), None);
    }
}
