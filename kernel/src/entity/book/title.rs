use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }
}

/// Short title used where the full title does not fit, e.g. on spine labels.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookShortName(String);

impl BookShortName {
    pub fn new(short_name: impl Into<String>) -> Self {
        Self(short_name.into())
    }
}
