use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookId, BookTitle, PartnerId};
use crate::search::StoredFilter;
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    async fn find_by_title(
        &self,
        con: &mut Self::Transaction,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    /// Results follow [`Book::listing_order`].
    async fn find_by_filter(
        &self,
        con: &mut Self::Transaction,
        filter: &StoredFilter,
    ) -> error_stack::Result<Vec<Book>, KernelError>;
    async fn find_by_publisher(
        &self,
        con: &mut Self::Transaction,
        publisher: &PartnerId,
    ) -> error_stack::Result<Vec<Book>, KernelError>;
    async fn find_by_author(
        &self,
        con: &mut Self::Transaction,
        author: &PartnerId,
    ) -> error_stack::Result<Vec<Book>, KernelError>;
}

pub trait DependOnBookQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookQuery: BookQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_query(&self) -> &Self::BookQuery;
}
