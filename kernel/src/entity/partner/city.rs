use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct PartnerCity(String);

impl PartnerCity {
    pub fn new(city: impl Into<String>) -> Self {
        Self(city.into())
    }
}
