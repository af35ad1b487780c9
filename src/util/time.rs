use std::time::Instant;

/// Formats fractional seconds as `H:MM:SS`.
///
/// Hours are unpadded and unbounded up to 99; anything past that collapses
/// to `--:--:--`, as do non-finite or negative inputs (an ETA computed from
/// near-zero progress blows up to infinity and must not leak into the frame).
///
/// ```rust,ignore
/// assert_eq!(format_time(3661.0), "1:01:01");
/// assert_eq!(format_time(f64::INFINITY), "--:--:--");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "--:--:--".to_string();
    }
    let whole = seconds as u64;
    let hours = whole / 3600;
    if hours > 99 {
        return "--:--:--".to_string();
    }
    format!("{}:{:02}:{:02}", hours, (whole % 3600) / 60, whole % 60)
}

/// Estimated seconds until `progress` reaches `total`, extrapolating from
/// the pace so far.
///
/// Returns `f64::INFINITY` when `progress` is zero or negative (no pace to
/// extrapolate from — [`format_time`] renders it as `--:--:--`) and `0.0`
/// once `progress` has reached `total`.
pub fn time_remaining(elapsed: f64, progress: f64, total: f64) -> f64 {
    if progress <= 0.0 {
        return f64::INFINITY;
    }
    if progress >= total {
        return 0.0;
    }
    elapsed / progress * (total - progress)
}

/// Fractional seconds since `start`.
pub fn elapsed_secs(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}
