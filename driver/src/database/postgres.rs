use error_stack::Report;
use sqlx::{Error, Executor, PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::KernelError;

use crate::env;
use crate::error::ConvertError;

pub use self::{book::*, member::*, partner::*};

mod book;
mod member;
mod partner;

static POSTGRES_URL: &str = "POSTGRES_URL";
static SCHEMA: &str = include_str!("../../migrations/0001_library.sql");

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const POSITIVE_PAGE_CONSTRAINT: &str = "books_positive_page";

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let pool = Pool::connect(&url).await.convert_error()?;
        Ok(Self { pool })
    }

    /// Creates the library tables when they are missing.
    pub async fn migrate(&self) -> error_stack::Result<(), KernelError> {
        self.pool.execute(SCHEMA).await.convert_error()?;
        tracing::info!("postgres schema is up to date");
        Ok(())
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Transaction = PostgresTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let transaction = self.pool.begin().await.convert_error()?;
        Ok(PostgresTransaction(transaction))
    }
}

pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

impl PostgresTransaction {
    pub(in crate::database) fn connection(&mut self) -> &mut PgConnection {
        &mut self.0
    }
}

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

impl<T> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = match &error {
                Error::PoolTimedOut => KernelError::Timeout,
                Error::Database(database) => match database.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => KernelError::UniquenessViolation,
                    Some(FOREIGN_KEY_VIOLATION) => KernelError::NotFound,
                    Some(CHECK_VIOLATION)
                        if database.constraint() == Some(POSITIVE_PAGE_CONSTRAINT) =>
                    {
                        KernelError::PositiveValueViolation
                    }
                    Some(CHECK_VIOLATION) => KernelError::Validation,
                    _ => KernelError::Internal,
                },
                _ => KernelError::Internal,
            };
            Report::from(error).change_context(context)
        })
    }
}
