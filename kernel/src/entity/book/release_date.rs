use std::fmt::Display;

use error_stack::Report;
use serde::{Deserialize, Serialize};
use time::Date;
use vodca::{AsRefln, Fromln};

use crate::KernelError;

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Fromln, AsRefln,
)]
pub struct ReleaseDate(Date);

impl ReleaseDate {
    /// Wraps a date without checking it. Used when restoring stored rows.
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }

    /// Write-path constructor: a release date may not lie after `today`.
    pub fn validated(
        date: impl Into<Date>,
        today: Date,
    ) -> error_stack::Result<Self, KernelError> {
        let date = date.into();
        if date > today {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "Release date must be in the past: {date} is after {today}"
            )));
        }
        Ok(Self(date))
    }
}

impl Display for ReleaseDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;

    use super::ReleaseDate;
    use crate::KernelError;

    #[test]
    fn future_date_is_rejected() {
        let error = ReleaseDate::validated(date!(2024 - 03 - 02), date!(2024 - 03 - 01))
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
    }

    #[test]
    fn today_and_past_are_accepted() {
        let today = date!(2024 - 03 - 01);
        assert!(ReleaseDate::validated(today, today).is_ok());
        assert!(ReleaseDate::validated(date!(1999 - 12 - 31), today).is_ok());
    }

    #[test]
    fn displays_as_iso_date() {
        assert_eq!(ReleaseDate::new(date!(2021 - 07 - 09)).to_string(), "2021-07-09");
    }
}
