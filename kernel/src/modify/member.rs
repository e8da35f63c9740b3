use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Member, MemberId};
use crate::KernelError;

/// Member numbers are unique; drivers report duplicates as
/// [`KernelError::UniquenessViolation`].
#[async_trait::async_trait]
pub trait MemberModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError>;
    async fn update(
        &self,
        con: &mut Self::Transaction,
        member: &Member,
    ) -> error_stack::Result<(), KernelError>;
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        member_id: &MemberId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnMemberModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type MemberModifier: MemberModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn member_modifier(&self) -> &Self::MemberModifier;
}
