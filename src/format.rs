/// Render a duration as `"250 ms"` below one second, otherwise as
/// `"1h 5m 3s"` with leading zero units dropped. Negative input counts as zero.
pub fn human_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds < 1.0 {
        return format!("{:.0} ms", seconds * 1000.0);
    }
    if seconds.is_infinite() {
        return "unavailable".to_string();
    }

    let total = seconds.round() as u64;
    let (hours, rest) = (total / 3600, total % 3600);
    let (mins, secs) = (rest / 60, rest % 60);

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if mins > 0 {
        parts.push(format!("{mins}m"));
    }
    parts.push(format!("{secs}s"));
    parts.join(" ")
}

/// Short form used by the prompt: `"Xm Ys"` or `"Ys"`.
pub fn format_min_sec(seconds: f64) -> String {
    if seconds.is_infinite() {
        return "unavailable".to_string();
    }
    let total = seconds.max(0.0).round() as u64;
    let (mins, secs) = (total / 60, total % 60);
    if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
