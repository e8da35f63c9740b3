use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use kernel::prelude::entity::MemberProfile;

/// Member as seen by callers: identity comes from the backing partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub id: Uuid,
    pub partner: Uuid,
    pub number: String,
    pub name: String,
    pub city: Option<String>,
    pub joined_on: Date,
    pub left_on: Option<Date>,
    pub active: bool,
}

impl MemberDto {
    pub fn new(profile: MemberProfile<'_>, today: Date) -> Self {
        let member = profile.member();
        let id: &Uuid = member.id().as_ref();
        let partner: &Uuid = member.partner().as_ref();
        let number: &String = member.number().as_ref();
        let name: &String = profile.name().as_ref();
        let period = member.period();
        Self {
            id: *id,
            partner: *partner,
            number: number.clone(),
            name: name.clone(),
            city: profile.city().map(|city| String::from(city.clone())),
            joined_on: *period.joined_on(),
            left_on: *period.left_on(),
            active: period.is_active_on(today),
        }
    }
}

pub struct GetMemberDto {
    pub id: Uuid,
}

pub struct CreateMemberDto {
    pub partner: Uuid,
    pub number: String,
    pub joined_on: Date,
    pub left_on: Option<Date>,
}

pub struct DeleteMemberDto {
    pub id: Uuid,
}
