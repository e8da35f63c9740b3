use serde::{Deserialize, Serialize};
use time::Date;
use vodca::{AsRefln, Fromln};

/// Day of the last field write.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Fromln, AsRefln,
)]
pub struct DateUpdated(Date);

impl DateUpdated {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }
}
