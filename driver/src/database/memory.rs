use std::collections::HashMap;
use std::sync::Arc;

use error_stack::Report;
use tokio::sync::RwLock;

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::prelude::entity::{Book, BookId, Member, MemberId, Partner, PartnerId};
use kernel::KernelError;

pub use self::{book::*, member::*, partner::*};

mod book;
mod member;
mod partner;

#[derive(Debug, Clone, Default)]
pub(in crate::database) struct Store {
    generation: u64,
    books: HashMap<BookId, Book>,
    partners: HashMap<PartnerId, Partner>,
    members: HashMap<MemberId, Member>,
}

/// Process-local storage. Each transaction works on a snapshot that replaces
/// the shared state on commit, provided nobody committed in between.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    store: Arc<RwLock<Store>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let snapshot = self.store.read().await.clone();
        Ok(InMemoryTransaction {
            origin: Arc::clone(&self.store),
            working: snapshot,
            dirty: false,
        })
    }
}

pub struct InMemoryTransaction {
    origin: Arc<RwLock<Store>>,
    working: Store,
    dirty: bool,
}

impl InMemoryTransaction {
    pub(in crate::database) fn store(&self) -> &Store {
        &self.working
    }

    pub(in crate::database) fn store_mut(&mut self) -> &mut Store {
        self.dirty = true;
        &mut self.working
    }
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        if !self.dirty {
            return Ok(());
        }
        let mut origin = self.origin.write().await;
        if origin.generation != self.working.generation {
            return Err(Report::new(KernelError::Concurrency).attach_printable(format!(
                "store moved to generation {} while this transaction started at {}",
                origin.generation, self.working.generation
            )));
        }
        let mut working = self.working;
        working.generation += 1;
        tracing::debug!("in-memory store committed generation {}", working.generation);
        *origin = working;
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        if self.dirty {
            tracing::debug!("in-memory transaction discarded");
        }
        Ok(())
    }
}
