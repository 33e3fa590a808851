//! Caption timestamp parsing
//!
//! Converts `HH:MM:SS.mmm` / `HH:MM:SS,mmm` cue times into seconds.

use regex::Captures;

// helper.
macro_rules! static_regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}
pub(crate) use static_regex;

/// Parse a cue timestamp into seconds, rounded to millisecond precision.
///
/// The comma variant is normalized to a period before parsing. Hours are not
/// capped at 23, so captions for streams longer than a day still parse.
/// Minutes and seconds must be in `0..=59`; the fractional part takes 1 to 6
/// digits and is read as a right-padded microsecond count (`.5` is 500 ms).
///
/// Returns `None` when the text does not match the pattern exactly.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let normalized = text.replace(',', ".");
    let caps = static_regex!(r"^(\d+):(\d{1,2}):(\d{1,2})\.(\d{1,6})$").captures(&normalized)?;

    let hours: u64 = field(&caps, 1)?;
    let minutes: u64 = field(&caps, 2)?;
    let seconds: u64 = field(&caps, 3)?;
    if minutes > 59 || seconds > 59 {
        return None;
    }

    let fraction = &caps[4];
    let micros: u64 = format!("{:0<6}", fraction).parse().ok()?;

    let whole = hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)?;
    let total_micros = whole.checked_mul(1_000_000)?.checked_add(micros)?;
    Some(round_millis(total_micros) as f64 / 1000.0)
}

fn field(caps: &Captures<'_>, idx: usize) -> Option<u64> {
    caps.get(idx)?.as_str().parse().ok()
}

/// Microseconds to whole milliseconds, ties to even.
fn round_millis(micros: u64) -> u64 {
    let (millis, rem) = (micros / 1000, micros % 1000);
    match rem {
        0..=499 => millis,
        500 if millis % 2 == 0 => millis,
        _ => millis + 1,
    }
}
