use error_stack::Report;

use kernel::interface::query::MemberQuery;
use kernel::interface::update::MemberModifier;
use kernel::prelude::entity::{Member, MemberId, MemberNumber, PartnerId};
use kernel::KernelError;

use crate::database::memory::Store;
use crate::database::InMemoryTransaction;

pub struct InMemoryMemberRepository;

#[async_trait::async_trait]
impl MemberQuery for InMemoryMemberRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &MemberId,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        Ok(con.store().members.get(id).cloned())
    }

    async fn find_by_number(
        &self,
        con: &mut InMemoryTransaction,
        number: &MemberNumber,
    ) -> error_stack::Result<Option<Member>, KernelError> {
        Ok(con
            .store()
            .members
            .values()
            .find(|member| member.number() == number)
            .cloned())
    }

    async fn find_by_partner(
        &self,
        con: &mut InMemoryTransaction,
        partner: &PartnerId,
    ) -> error_stack::Result<Vec<Member>, KernelError> {
        let mut members: Vec<Member> = con
            .store()
            .members
            .values()
            .filter(|member| member.partner() == partner)
            .cloned()
            .collect();
        members.sort_by(|left, right| left.period().joined_on().cmp(right.period().joined_on()));
        Ok(members)
    }
}

#[async_trait::async_trait]
impl MemberModifier for InMemoryMemberRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError> {
        if con.store().members.contains_key(member.id()) {
            return Err(Report::new(KernelError::UniquenessViolation)
                .attach_printable(format!("member {:?} already exists", member.id())));
        }
        check_constraints(con.store(), member)?;
        con.store_mut()
            .members
            .insert(member.id().clone(), member.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError> {
        if !con.store().members.contains_key(member.id()) {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("member {:?}", member.id())));
        }
        check_constraints(con.store(), member)?;
        con.store_mut()
            .members
            .insert(member.id().clone(), member.clone());
        Ok(())
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        member_id: &MemberId,
    ) -> error_stack::Result<(), KernelError> {
        con.store_mut().members.remove(member_id);
        Ok(())
    }
}

fn check_constraints(store: &Store, member: &Member) -> error_stack::Result<(), KernelError> {
    if !store.partners.contains_key(member.partner()) {
        return Err(Report::new(KernelError::NotFound)
            .attach_printable(format!("partner {:?} backing member", member.partner())));
    }
    let duplicated = store
        .members
        .values()
        .any(|other| other.id() != member.id() && other.number() == member.number());
    if duplicated {
        return Err(Report::new(KernelError::UniquenessViolation)
            .attach_printable("Member number must be unique."));
    }
    Ok(())
}
