use std::fmt::Display;
use std::str::FromStr;

use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{BookId, MemberId, PartnerId};
use crate::KernelError;

const BOOK_KIND: &str = "book";
const PARTNER_KIND: &str = "partner";
const MEMBER_KIND: &str = "member";

/// Link to any record kind that can be referenced from a book.
///
/// The set of kinds is closed; the textual form `"<kind>,<uuid>"` is what
/// drivers persist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DocumentReference {
    Book(BookId),
    Partner(PartnerId),
    Member(MemberId),
}

impl DocumentReference {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentReference::Book(_) => BOOK_KIND,
            DocumentReference::Partner(_) => PARTNER_KIND,
            DocumentReference::Member(_) => MEMBER_KIND,
        }
    }

    fn uuid(&self) -> &Uuid {
        match self {
            DocumentReference::Book(id) => id.as_ref(),
            DocumentReference::Partner(id) => id.as_ref(),
            DocumentReference::Member(id) => id.as_ref(),
        }
    }
}

impl Display for DocumentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.kind(), self.uuid())
    }
}

impl FromStr for DocumentReference {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(',').ok_or_else(|| {
            Report::new(KernelError::Validation)
                .attach_printable(format!("malformed document reference `{s}`"))
        })?;
        let id = Uuid::parse_str(id.trim())
            .change_context(KernelError::Validation)
            .attach_printable_lazy(|| format!("malformed document reference id `{id}`"))?;
        match kind.trim() {
            BOOK_KIND => Ok(Self::Book(BookId::new(id))),
            PARTNER_KIND => Ok(Self::Partner(PartnerId::new(id))),
            MEMBER_KIND => Ok(Self::Member(MemberId::new(id))),
            other => Err(Report::new(KernelError::Validation)
                .attach_printable(format!("unknown referenced kind `{other}`"))),
        }
    }
}
