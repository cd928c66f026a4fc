pub const DEFAULT_DURATION_SECS: u32 = 30;
pub const MIN_DURATION_SECS: u32 = 5;
pub const MAX_DURATION_SECS: u32 = 600;

/// Turns raw duration text into a playable number of seconds.
///
/// Blank, non-numeric or NaN text falls back to the default; numbers are
/// clamped into `[MIN_DURATION_SECS, MAX_DURATION_SECS]`, infinities
/// included. Fractions are truncated.
pub fn normalize_duration(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_DURATION_SECS;
    }

    let parsed = match trimmed.parse::<i64>() {
        Ok(n) => n,
        Err(_) => match trimmed.parse::<f64>() {
            Ok(f) if f.is_nan() => return DEFAULT_DURATION_SECS,
            // saturating cast: +inf lands on i64::MAX, -inf on i64::MIN
            Ok(f) => f.trunc() as i64,
            Err(_) => return DEFAULT_DURATION_SECS,
        },
    };

    parsed.clamp(MIN_DURATION_SECS as i64, MAX_DURATION_SECS as i64) as u32
}
