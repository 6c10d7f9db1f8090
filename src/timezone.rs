//! Resolves the local calendar date used to fill in missing transaction dates.

use time::{
    Date, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The format of dates in the data file and the API, e.g. "2024-03-01".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Where "today" is decided.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalTimezone {
    /// A canonical timezone name, e.g. "Asia/Jakarta".
    Named(String),
    /// A fixed offset, usually the system offset captured at startup.
    Fixed(UtcOffset),
}

impl LocalTimezone {
    /// Create a [LocalTimezone::Named] after checking that `canonical_timezone` exists.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the name is not a known timezone.
    pub fn named(canonical_timezone: &str) -> Result<Self, Error> {
        match get_local_offset(canonical_timezone) {
            Some(_) => Ok(Self::Named(canonical_timezone.to_owned())),
            None => Err(Error::InvalidTimezone(canonical_timezone.to_owned())),
        }
    }

    /// The system's local offset, or UTC if it cannot be determined.
    ///
    /// On some platforms the offset can only be read while the process is
    /// single threaded, so call this before starting the async runtime.
    pub fn system() -> Self {
        match UtcOffset::current_local_offset() {
            Ok(offset) => Self::Fixed(offset),
            Err(error) => {
                tracing::warn!("Could not determine the local offset, using UTC: {error}");
                Self::Fixed(UtcOffset::UTC)
            }
        }
    }

    /// The current offset from UTC.
    pub fn offset(&self) -> Result<UtcOffset, Error> {
        match self {
            Self::Named(name) => {
                get_local_offset(name).ok_or_else(|| Error::InvalidTimezone(name.clone()))
            }
            Self::Fixed(offset) => Ok(*offset),
        }
    }

    /// Today's date in this timezone.
    pub fn today(&self) -> Result<Date, Error> {
        Ok(OffsetDateTime::now_utc().to_offset(self.offset()?).date())
    }
}

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Format `date` as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}
