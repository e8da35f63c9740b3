use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::Partner;
use crate::KernelError;

#[async_trait::async_trait]
pub trait PartnerModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        partner: &Partner,
    ) -> error_stack::Result<(), KernelError>;
    async fn update(
        &self,
        con: &mut Self::Transaction,
        partner: &Partner,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnPartnerModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type PartnerModifier: PartnerModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn partner_modifier(&self) -> &Self::PartnerModifier;
}
