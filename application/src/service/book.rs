use std::collections::HashSet;

use error_stack::Report;
use uuid::Uuid;

use kernel::interface::clock::{Clock, DependOnClock};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery, DependOnPartnerQuery, PartnerQuery};
use kernel::interface::search::{BookFilter, Predicate};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{
    Book, BookAuthors, BookId, BookShortName, BookState, BookTitle, BookUpdate, DerivedField,
    PageCount, PartnerId,
};
use kernel::prelude::workflow::BookWorkflow;
use kernel::KernelError;

use crate::transfer::{
    ArchiveBookDto, BookBatchDto, BookDto, ChangeBookStateDto, CreateBookDto, GetBookDto,
    SearchBookDto, UpdateBookDto,
};

fn book_not_found(id: &BookId) -> Report<KernelError> {
    let id: &Uuid = id.as_ref();
    Report::new(KernelError::NotFound).attach_printable(format!("book {id} does not exist"))
}

#[async_trait::async_trait]
pub trait GetBookService:
    'static + Sync + Send + DependOnClock + DependOnBookQuery + DependOnPartnerQuery
{
    #[tracing::instrument(skip_all)]
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let Some(book) = self.book_query().find_by_id(&mut connection, &id).await? else {
            tracing::debug!("book {} not found", dto.id);
            return Ok(None);
        };
        let publisher = match book.publisher() {
            Some(publisher) => {
                self.partner_query()
                    .find_by_id(&mut connection, publisher)
                    .await?
            }
            None => None,
        };

        let today = self.clock().today();
        Ok(Some(BookDto::new(book, today, publisher.as_ref())))
    }
}

impl<T> GetBookService for T where T: DependOnClock + DependOnBookQuery + DependOnPartnerQuery {}

#[async_trait::async_trait]
pub trait CreateBookService: 'static + Sync + Send + DependOnClock + DependOnBookModifier {
    #[tracing::instrument(skip_all)]
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let today = self.clock().today();
        let uuid = Uuid::new_v4();
        let mut book = Book::create(
            BookId::new(uuid),
            BookTitle::new(dto.title),
            BookShortName::new(dto.short_name),
            PageCount::new(dto.page_count),
            dto.release_date,
            today,
        )?;
        book.apply(
            BookUpdate {
                authors: Some(BookAuthors::new(dto.authors.into_iter().map(PartnerId::new))),
                publisher: Some(dto.publisher.map(PartnerId::new)),
                ..Default::default()
            },
            today,
        )?;

        self.book_modifier().create(&mut connection, &book).await?;
        connection.commit().await?;

        tracing::info!("created book {uuid}");
        Ok(uuid)
    }
}

impl<T> CreateBookService for T where T: DependOnClock + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait UpdateBookService:
    'static + Sync + Send + DependOnClock + DependOnBookQuery + DependOnBookModifier
{
    /// Field writes are applied together; a requested age is written last
    /// through the release date.
    #[tracing::instrument(skip_all)]
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let (id, update, age_days) = dto.into_parts()?;
        let mut book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| book_not_found(&id))?;

        let today = self.clock().today();
        book.apply(update, today)?;
        if let Some(age_days) = age_days {
            age_days.set(&mut book, today)?;
        }

        self.book_modifier().update(&mut connection, &book).await?;
        connection.commit().await?;

        tracing::debug!("updated book {}", book.display_name());
        Ok(())
    }
}

impl<T> UpdateBookService for T where T: DependOnClock + DependOnBookQuery + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait ChangeBookStateService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    /// Moves every listed book, in the given order, to the target state.
    /// Nothing is stored unless all of them may make the move. An id may
    /// appear only once per batch.
    #[tracing::instrument(skip_all)]
    async fn change_book_state(
        &self,
        dto: ChangeBookStateDto,
    ) -> error_stack::Result<(), KernelError> {
        let state = dto.state.parse::<BookState>()?;
        self.move_books(dto.ids, state).await
    }

    async fn make_available(&self, dto: BookBatchDto) -> error_stack::Result<(), KernelError> {
        self.move_books(dto.ids, BookState::Available).await
    }

    async fn make_borrowed(&self, dto: BookBatchDto) -> error_stack::Result<(), KernelError> {
        self.move_books(dto.ids, BookState::Borrowed).await
    }

    async fn make_lost(&self, dto: BookBatchDto) -> error_stack::Result<(), KernelError> {
        self.move_books(dto.ids, BookState::Lost).await
    }

    async fn move_books(
        &self,
        ids: Vec<Uuid>,
        state: BookState,
    ) -> error_stack::Result<(), KernelError> {
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(repeated) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(Report::new(KernelError::Validation)
                .attach_printable(format!("book {repeated} is listed more than once")));
        }

        let mut connection = self.database_connection().transact().await?;

        let mut books = Vec::with_capacity(ids.len());
        for id in ids {
            let id = BookId::new(id);
            let book = self
                .book_query()
                .find_by_id(&mut connection, &id)
                .await?
                .ok_or_else(|| book_not_found(&id))?;
            books.push(book);
        }

        if let Err(report) = books.as_mut_slice().change_state(state) {
            tracing::warn!("state change to {state} rejected, rolling back");
            connection.roll_back().await?;
            return Err(report);
        }

        for book in &books {
            self.book_modifier().update(&mut connection, book).await?;
        }
        connection.commit().await?;

        tracing::info!("moved {} book(s) to {state}", books.len());
        Ok(())
    }
}

impl<T> ChangeBookStateService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait SearchBookService:
    'static + Sync + Send + DependOnClock + DependOnBookQuery + DependOnPartnerQuery
{
    /// Predicates may use `age_days`; it is resolved against today's date
    /// before reaching storage.
    #[tracing::instrument(skip_all)]
    async fn search_books(&self, dto: SearchBookDto) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut filter = BookFilter::new();
        for predicate in dto.predicates {
            filter = filter.and(Predicate::try_from(predicate)?);
        }
        if dto.include_archived {
            filter = filter.with_archived();
        }

        let today = self.clock().today();
        let filter = filter.resolve(today)?;

        let mut connection = self.database_connection().transact().await?;
        let books = self
            .book_query()
            .find_by_filter(&mut connection, &filter)
            .await?;
        tracing::debug!("search matched {} book(s)", books.len());

        let mut found = Vec::with_capacity(books.len());
        for book in books {
            let publisher = match book.publisher() {
                Some(publisher) => {
                    self.partner_query()
                        .find_by_id(&mut connection, publisher)
                        .await?
                }
                None => None,
            };
            found.push(BookDto::new(book, today, publisher.as_ref()));
        }
        Ok(found)
    }
}

impl<T> SearchBookService for T where T: DependOnClock + DependOnBookQuery + DependOnPartnerQuery {}

#[async_trait::async_trait]
pub trait ArchiveBookService: 'static + Sync + Send + DependOnBookQuery + DependOnBookModifier {
    /// Flips the archive flag and returns whether the book is now active.
    #[tracing::instrument(skip_all)]
    async fn toggle_book_archive(&self, dto: ArchiveBookDto) -> error_stack::Result<bool, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BookId::new(dto.id);
        let mut book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| book_not_found(&id))?;
        book.substitute(|book| book.archive.toggle());
        let active = book.archive().is_active();

        self.book_modifier().update(&mut connection, &book).await?;
        connection.commit().await?;

        tracing::info!("book {} active: {active}", dto.id);
        Ok(active)
    }
}

impl<T> ArchiveBookService for T where T: DependOnBookQuery + DependOnBookModifier {}
