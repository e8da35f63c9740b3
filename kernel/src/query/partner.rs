use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Partner, PartnerId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait PartnerQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &PartnerId,
    ) -> error_stack::Result<Option<Partner>, KernelError>;
}

pub trait DependOnPartnerQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type PartnerQuery: PartnerQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn partner_query(&self) -> &Self::PartnerQuery;
}
