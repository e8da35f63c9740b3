use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vodca::{AsRefln, Fromln};

/// Reference to a book category. Categories are maintained elsewhere; a book
/// only points at one.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookCategoryId(Uuid);

impl BookCategoryId {
    pub fn new(id: impl Into<Uuid>) -> Self {
        Self(id.into())
    }
}
