mod id;
mod number;
mod period;

pub use self::{id::*, number::*, period::*};

use destructure::{Destructure, Mutation};
use error_stack::Report;
use vodca::References;

use crate::entity::{Partner, PartnerCity, PartnerId, PartnerName};
use crate::KernelError;

/// Library membership of a partner. Identity (name, city) lives on the
/// partner; a member only adds membership data.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Member {
    id: MemberId,
    partner: PartnerId,
    number: MemberNumber,
    period: MembershipPeriod,
}

impl Member {
    pub fn new(
        id: MemberId,
        partner: PartnerId,
        number: MemberNumber,
        period: MembershipPeriod,
    ) -> Self {
        Self {
            id,
            partner,
            number,
            period,
        }
    }

    /// Pairs the member with its partner record so identity fields can be
    /// read through it.
    pub fn profile<'a>(
        &'a self,
        partner: &'a Partner,
    ) -> error_stack::Result<MemberProfile<'a>, KernelError> {
        if partner.id() != &self.partner {
            return Err(Report::new(KernelError::Internal).attach_printable(format!(
                "partner {:?} does not back member {:?}",
                partner.id(),
                self.id
            )));
        }
        Ok(MemberProfile {
            member: self,
            partner,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MemberProfile<'a> {
    member: &'a Member,
    partner: &'a Partner,
}

impl<'a> MemberProfile<'a> {
    pub fn member(&self) -> &'a Member {
        self.member
    }

    pub fn name(&self) -> &'a PartnerName {
        self.partner.name()
    }

    pub fn city(&self) -> Option<&'a PartnerCity> {
        self.partner.city().as_ref()
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use super::{Member, MemberId, MemberNumber, MembershipPeriod};
    use crate::entity::{Partner, PartnerCity, PartnerId, PartnerName};
    use crate::KernelError;

    fn partner() -> Partner {
        Partner::new(
            PartnerId::new(Uuid::new_v4()),
            PartnerName::new("Ada Lovelace"),
            Some(PartnerCity::new("London")),
        )
    }

    #[test]
    fn profile_delegates_identity_to_partner() {
        let partner = partner();
        let member = Member::new(
            MemberId::new(Uuid::new_v4()),
            partner.id().clone(),
            MemberNumber::new("M-0001"),
            MembershipPeriod::new(date!(2024 - 01 - 01), None).unwrap(),
        );
        let profile = member.profile(&partner).unwrap();
        assert_eq!(profile.name(), &PartnerName::new("Ada Lovelace"));
        assert_eq!(profile.city(), Some(&PartnerCity::new("London")));
        assert_eq!(profile.member().number(), &MemberNumber::new("M-0001"));
    }

    #[test]
    fn profile_rejects_foreign_partner() {
        let member = Member::new(
            MemberId::new(Uuid::new_v4()),
            PartnerId::new(Uuid::new_v4()),
            MemberNumber::new("M-0002"),
            MembershipPeriod::new(date!(2024 - 01 - 01), None).unwrap(),
        );
        let error = member.profile(&partner()).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Internal);
    }
}
