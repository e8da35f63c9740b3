use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kernel::prelude::entity::{Book, DestructPartner, Partner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerDto {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub active: bool,
    pub published_books: Vec<Uuid>,
    pub authored_books: Vec<Uuid>,
}

impl PartnerDto {
    pub fn new(partner: Partner, published: Vec<Book>, authored: Vec<Book>) -> Self {
        let DestructPartner {
            id,
            name,
            city,
            archive,
        } = partner.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            city: city.map(String::from),
            active: archive.is_active(),
            published_books: published.iter().map(book_id).collect(),
            authored_books: authored.iter().map(book_id).collect(),
        }
    }
}

fn book_id(book: &Book) -> Uuid {
    let id: &Uuid = book.id().as_ref();
    *id
}

pub struct GetPartnerDto {
    pub id: Uuid,
}

pub struct CreatePartnerDto {
    pub name: String,
    pub city: Option<String>,
}

pub struct UpdatePartnerDto {
    pub id: Uuid,
    pub name: Option<String>,
    pub city: Option<Option<String>>,
}

pub struct ArchivePartnerDto {
    pub id: Uuid,
}
