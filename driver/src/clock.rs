use error_stack::ResultExt;
use time::{Date, OffsetDateTime, UtcOffset};

use kernel::interface::clock::Clock;
use kernel::KernelError;

use crate::env_opt;
use crate::error::{ConvertError, DriverError};

static UTC_OFFSET_HOURS: &str = "LIBRARY_UTC_OFFSET_HOURS";

/// Wall clock. "Today" is the current date at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Reads the offset from `LIBRARY_UTC_OFFSET_HOURS`, defaulting to UTC.
    pub fn from_env() -> error_stack::Result<Self, KernelError> {
        let Some(hours) = env_opt(UTC_OFFSET_HOURS)? else {
            return Ok(Self::new(UtcOffset::UTC));
        };
        let hours = hours
            .trim()
            .parse::<i8>()
            .map_err(DriverError::from)
            .convert_error()
            .attach_printable_lazy(|| format!("{UTC_OFFSET_HOURS} must be a whole number of hours"))?;
        let offset = UtcOffset::from_hms(hours, 0, 0)
            .map_err(DriverError::from)
            .convert_error()
            .attach_printable_lazy(|| format!("{UTC_OFFSET_HOURS} is out of range"))?;
        tracing::debug!("system clock uses offset {offset}");
        Ok(Self::new(offset))
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.offset).date()
    }
}

/// Clock frozen on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(Date);

impl FixedClock {
    pub fn new(today: impl Into<Date>) -> Self {
        Self(today.into())
    }
}

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
