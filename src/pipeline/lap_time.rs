use thiserror::Error;

use crate::domain::types::Millis;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LapTimeError {
    #[error("unsupported lap time format: \"{0}\"")]
    UnsupportedFormat(String),

    #[error("lap time out of range: \"{0}\"")]
    OutOfRange(String),
}

/// Parses a lap-duration string into milliseconds.
///
/// Accepted shapes:
/// - `"81345"`     raw integer milliseconds
/// - `"1:21.345"`  minutes:seconds.milliseconds, seconds 00..=59,
///   exactly 3 fraction digits
/// - `"21.345"`    seconds.fraction with 1..=3 digits, right-padded
///   to milliseconds
pub fn lap_str_to_ms(s: &str) -> Result<Millis, LapTimeError> {
    let ss = s.trim();
    if ss.is_empty() {
        return Err(LapTimeError::UnsupportedFormat(s.to_string()));
    }

    // Raw millisecond count
    if ss.chars().all(|c| c.is_ascii_digit()) {
        let ms = ss
            .parse::<u64>()
            .map_err(|_| LapTimeError::OutOfRange(s.to_string()))?;
        return Ok(Millis(ms));
    }

    // "M:SS.mmm"
    if let Some((minutes_part, rest)) = ss.split_once(':') {
        let Some((seconds_part, millis_part)) = rest.split_once('.') else {
            return Err(LapTimeError::UnsupportedFormat(s.to_string()));
        };
        if minutes_part.is_empty()
            || !minutes_part.chars().all(|c| c.is_ascii_digit())
            || seconds_part.len() != 2
            || !seconds_part.chars().all(|c| c.is_ascii_digit())
            || millis_part.len() != 3
            || !millis_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(LapTimeError::UnsupportedFormat(s.to_string()));
        }

        let minutes = minutes_part
            .parse::<u64>()
            .map_err(|_| LapTimeError::OutOfRange(s.to_string()))?;
        let seconds: u64 = seconds_part
            .parse()
            .map_err(|_| LapTimeError::OutOfRange(s.to_string()))?;
        let millis: u64 = millis_part
            .parse()
            .map_err(|_| LapTimeError::OutOfRange(s.to_string()))?;

        if seconds > 59 {
            return Err(LapTimeError::UnsupportedFormat(s.to_string()));
        }
        // Minutes are unbounded input; the multiplication must not wrap
        let total = minutes
            .checked_mul(60_000)
            .and_then(|ms| ms.checked_add(seconds * 1_000 + millis))
            .ok_or_else(|| LapTimeError::OutOfRange(s.to_string()))?;
        return Ok(Millis(total));
    }

    // "S.f" with 1..=3 fraction digits
    if let Some((seconds_part, frac_part)) = ss.split_once('.') {
        if seconds_part.is_empty()
            || !seconds_part.chars().all(|c| c.is_ascii_digit())
            || frac_part.is_empty()
            || frac_part.len() > 3
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(LapTimeError::UnsupportedFormat(s.to_string()));
        }

        let seconds = seconds_part
            .parse::<u64>()
            .map_err(|_| LapTimeError::OutOfRange(s.to_string()))?;
        // Right-pad the fraction to milliseconds: "3" -> 300, "34" -> 340
        let mut frac = frac_part.to_string();
        while frac.len() < 3 {
            frac.push('0');
        }
        let millis: u64 = frac
            .parse()
            .map_err(|_| LapTimeError::OutOfRange(s.to_string()))?;

        let total = seconds
            .checked_mul(1_000)
            .and_then(|ms| ms.checked_add(millis))
            .ok_or_else(|| LapTimeError::OutOfRange(s.to_string()))?;
        return Ok(Millis(total));
    }

    Err(LapTimeError::UnsupportedFormat(s.to_string()))
}

/// Encodes milliseconds as `"M:SS.mmm"`
pub fn ms_to_lap_str(ms: Millis) -> String {
    let total = ms.as_u64();
    let minutes = total / 60_000;
    let seconds = (total % 60_000) / 1_000;
    let millis = total % 1_000;
    format!("{}:{:02}.{:03}", minutes, seconds, millis)
}
