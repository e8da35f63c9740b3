use serde::{Deserialize, Serialize};
use vodca::AsRefln;

use crate::entity::PartnerId;

/// Ordered author list with duplicates removed. Every way in, deserializing
/// included, goes through [`BookAuthors::new`].
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize, AsRefln)]
#[serde(from = "Vec<PartnerId>", into = "Vec<PartnerId>")]
pub struct BookAuthors(Vec<PartnerId>);

impl BookAuthors {
    pub fn new(authors: impl IntoIterator<Item = PartnerId>) -> Self {
        let mut unique: Vec<PartnerId> = Vec::new();
        for author in authors {
            if !unique.contains(&author) {
                unique.push(author);
            }
        }
        Self(unique)
    }

    pub fn contains(&self, partner: &PartnerId) -> bool {
        self.0.contains(partner)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartnerId> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PartnerId>> for BookAuthors {
    fn from(authors: Vec<PartnerId>) -> Self {
        Self::new(authors)
    }
}

impl From<BookAuthors> for Vec<PartnerId> {
    fn from(authors: BookAuthors) -> Self {
        authors.0
    }
}
