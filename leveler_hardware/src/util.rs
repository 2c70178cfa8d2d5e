/// Hobby-servo travel in degrees.
pub const SERVO_RANGE_DEG: u16 = 180;

/// Convert a servo angle into a pulse width, linear between `min_us` (0°)
/// and `max_us` (180°). Angles beyond 180° are clamped.
pub fn angle_to_pulse_us(degrees: u16, min_us: u64, max_us: u64) -> u64 {
    let deg = u64::from(degrees.min(SERVO_RANGE_DEG));
    let span = max_us.saturating_sub(min_us);
    min_us + (deg * span) / u64::from(SERVO_RANGE_DEG)
}
