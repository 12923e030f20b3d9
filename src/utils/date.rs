//! UTC datetime utilities without timezone dependencies.
//!
//! Only what the remote freshness check needs: parsing the RFC 2822 dates
//! that `curl --head` reports as `Last-Modified` and converting them to
//! `SystemTime`.
//!
//! ```ignore
//! let dt = DateTimeUtc::parse_rfc2822("Sat, 15 Jun 2024 14:30:45 GMT").unwrap();
//! let mtime = dt.to_system_time();
//! ```

use anyhow::{Result, bail};
use std::time::{Duration, SystemTime};

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Parse `[Www, ]DD Mon YYYY HH:MM:SS GMT`.
    ///
    /// The weekday is optional and not checked; only `GMT`, `UTC`, `UT` and
    /// `+0000` zones are accepted.
    pub fn parse_rfc2822(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = match s.split_once(',') {
            Some((_, rest)) => rest.trim_start(),
            None => s,
        };

        let mut parts = s.split_whitespace();
        let day: u8 = parts.next()?.parse().ok()?;
        let month_name = parts.next()?;
        let month = MONTHS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(month_name))?;
        let year: u16 = parts.next()?.parse().ok()?;

        let mut time = parts.next()?.split(':');
        let hour = parse_u8(time.next()?.as_bytes())?;
        let minute = parse_u8(time.next()?.as_bytes())?;
        let second = parse_u8(time.next()?.as_bytes())?;
        if time.next().is_some() {
            return None;
        }

        match parts.next() {
            None | Some("GMT" | "UTC" | "UT" | "+0000" | "Z") => {}
            Some(_) => return None,
        }

        #[allow(clippy::cast_possible_truncation)] // position() < 12
        let dt = Self::new(year, month as u8 + 1, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt)
    }

    #[allow(clippy::trivially_copy_pass_by_ref)] // Method style is more idiomatic
    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if year < 1970 {
            bail!("year is before the unix epoch: {year}");
        }
        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Seconds since the unix epoch.
    pub fn to_unix_seconds(self) -> u64 {
        let mut days: u64 = (1970..self.year)
            .map(|y| if Self::is_leap_year(y) { 366 } else { 365 })
            .sum();
        days += (1..self.month)
            .map(|m| u64::from(Self::days_in_month(self.year, m)))
            .sum::<u64>();
        days += u64::from(self.day) - 1;

        days * 86_400
            + u64::from(self.hour) * 3600
            + u64::from(self.minute) * 60
            + u64::from(self.second)
    }

    pub fn to_system_time(self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.to_unix_seconds())
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}
