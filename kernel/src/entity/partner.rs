mod city;
mod id;
mod name;

pub use self::{city::*, id::*, name::*};

use destructure::{Destructure, Mutation};
use vodca::References;

use crate::entity::Archive;

/// Person or organization acting as author, publisher or member.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Partner {
    id: PartnerId,
    name: PartnerName,
    city: Option<PartnerCity>,
    archive: Archive,
}

impl Partner {
    pub fn new(id: PartnerId, name: PartnerName, city: Option<PartnerCity>) -> Self {
        Self {
            id,
            name,
            city,
            archive: Archive::default(),
        }
    }
}
