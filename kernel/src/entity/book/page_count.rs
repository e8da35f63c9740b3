use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Number of pages. Positivity is a storage constraint, so any value is
/// representable here and drivers reject non-positive ones on write.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct PageCount(i32);

impl PageCount {
    pub fn new(pages: impl Into<i32>) -> Self {
        Self(pages.into())
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}
