use error_stack::Report;

use kernel::interface::query::PartnerQuery;
use kernel::interface::update::PartnerModifier;
use kernel::prelude::entity::{Partner, PartnerId};
use kernel::KernelError;

use crate::database::InMemoryTransaction;

pub struct InMemoryPartnerRepository;

#[async_trait::async_trait]
impl PartnerQuery for InMemoryPartnerRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &PartnerId,
    ) -> error_stack::Result<Option<Partner>, KernelError> {
        Ok(con.store().partners.get(id).cloned())
    }
}

#[async_trait::async_trait]
impl PartnerModifier for InMemoryPartnerRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        partner: &Partner,
    ) -> error_stack::Result<(), KernelError> {
        let partners = &mut con.store_mut().partners;
        if partners.contains_key(partner.id()) {
            return Err(Report::new(KernelError::UniquenessViolation)
                .attach_printable(format!("partner {:?} already exists", partner.id())));
        }
        partners.insert(partner.id().clone(), partner.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        partner: &Partner,
    ) -> error_stack::Result<(), KernelError> {
        let stored = con
            .store_mut()
            .partners
            .get_mut(partner.id())
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("partner {:?}", partner.id()))
            })?;
        *stored = partner.clone();
        Ok(())
    }
}
