use error_stack::Report;

use kernel::interface::query::BookQuery;
use kernel::interface::search::StoredFilter;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{Book, BookId, BookTitle, PartnerId};
use kernel::KernelError;

use crate::database::memory::Store;
use crate::database::InMemoryTransaction;

pub struct InMemoryBookRepository;

#[async_trait::async_trait]
impl BookQuery for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con.store().books.get(id).cloned())
    }

    async fn find_by_title(
        &self,
        con: &mut InMemoryTransaction,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(MemBookInternal::select(con.store(), |book| book.title() == title)
            .into_iter()
            .next())
    }

    async fn find_by_filter(
        &self,
        con: &mut InMemoryTransaction,
        filter: &StoredFilter,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        Ok(MemBookInternal::select(con.store(), |book| filter.matches(book)))
    }

    async fn find_by_publisher(
        &self,
        con: &mut InMemoryTransaction,
        publisher: &PartnerId,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        Ok(MemBookInternal::select(con.store(), |book| {
            book.publisher().as_ref() == Some(publisher)
        }))
    }

    async fn find_by_author(
        &self,
        con: &mut InMemoryTransaction,
        author: &PartnerId,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        Ok(MemBookInternal::select(con.store(), |book| {
            book.is_authored_by(author)
        }))
    }
}

#[async_trait::async_trait]
impl BookModifier for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        if con.store().books.contains_key(book.id()) {
            return Err(Report::new(KernelError::UniquenessViolation)
                .attach_printable(format!("book {:?} already exists", book.id())));
        }
        MemBookInternal::check_constraints(con.store(), book)?;
        con.store_mut()
            .books
            .insert(book.id().clone(), book.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        if !con.store().books.contains_key(book.id()) {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("book {:?}", book.id())));
        }
        MemBookInternal::check_constraints(con.store(), book)?;
        con.store_mut()
            .books
            .insert(book.id().clone(), book.clone());
        Ok(())
    }
}

pub(in crate::database) struct MemBookInternal;

impl MemBookInternal {
    fn select(store: &Store, predicate: impl Fn(&Book) -> bool) -> Vec<Book> {
        let mut books: Vec<Book> = store
            .books
            .values()
            .filter(|book| predicate(*book))
            .cloned()
            .collect();
        books.sort_by(Book::listing_order);
        books
    }

    /// The same constraints the relational schema declares.
    fn check_constraints(store: &Store, book: &Book) -> error_stack::Result<(), KernelError> {
        if !book.page_count().is_positive() {
            return Err(Report::new(KernelError::PositiveValueViolation)
                .attach_printable("No of pages must be positive"));
        }
        let duplicated = store
            .books
            .values()
            .any(|other| other.id() != book.id() && other.title() == book.title());
        if duplicated {
            return Err(Report::new(KernelError::UniquenessViolation)
                .attach_printable("Book title must be unique."));
        }
        let partners = book.publisher().iter().chain(book.authors().iter());
        for partner in partners {
            if !store.partners.contains_key(partner) {
                return Err(Report::new(KernelError::NotFound)
                    .attach_printable(format!("partner {partner:?} referenced by book")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::BookQuery;
    use kernel::interface::search::{BookField, BookFilter, FilterValue, Operator, Predicate};
    use kernel::interface::update::{BookModifier, PartnerModifier};
    use kernel::prelude::entity::{
        Book, BookAuthors, BookId, BookShortName, BookTitle, BookUpdate, PageCount, Partner, PartnerId,
        PartnerName, ReleaseDate,
    };
    use kernel::KernelError;

    use crate::database::{InMemoryBookRepository, InMemoryDatabase, InMemoryPartnerRepository};

    fn book(title: &str, pages: i32, release_date: Option<ReleaseDate>) -> Book {
        Book::new(
            BookId::new(Uuid::new_v4()),
            BookTitle::new(title),
            BookShortName::new(title),
            PageCount::new(pages),
            release_date,
        )
    }

    #[tokio::test]
    async fn create_and_find() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let emma = book("Emma", 474, None);
        InMemoryBookRepository.create(&mut con, &emma).await?;

        let found = InMemoryBookRepository.find_by_id(&mut con, emma.id()).await?;
        assert_eq!(found, Some(emma.clone()));
        let found = InMemoryBookRepository
            .find_by_title(&mut con, &BookTitle::new("Emma"))
            .await?;
        assert_eq!(found, Some(emma));
        con.commit().await?;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        InMemoryBookRepository
            .create(&mut con, &book("Emma", 474, None))
            .await?;
        let error = InMemoryBookRepository
            .create(&mut con, &book("Emma", 300, None))
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::UniquenessViolation);
        Ok(())
    }

    #[tokio::test]
    async fn non_positive_page_count_is_rejected() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        for pages in [0, -3] {
            let error = InMemoryBookRepository
                .create(&mut con, &book("Empty", pages, None))
                .await
                .unwrap_err();
            assert_eq!(error.current_context(), &KernelError::PositiveValueViolation);
        }
        Ok(())
    }

    #[tokio::test]
    async fn unknown_author_is_rejected() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let mut orphan = book("Orphan", 10, None);
        orphan.apply(
            BookUpdate {
                authors: Some(BookAuthors::new([PartnerId::new(Uuid::new_v4())])),
                ..Default::default()
            },
            date!(2024 - 01 - 01),
        )?;
        let error = InMemoryBookRepository
            .create(&mut con, &orphan)
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn filter_by_translated_age() -> error_stack::Result<(), KernelError> {
        let today = date!(2024 - 03 - 31);
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let old = book("Old", 10, Some(ReleaseDate::new(date!(2023 - 01 - 01))));
        let fresh = book("Fresh", 10, Some(ReleaseDate::new(date!(2024 - 03 - 30))));
        let undated = book("Undated", 10, None);
        for book in [&old, &fresh, &undated] {
            InMemoryBookRepository.create(&mut con, book).await?;
        }

        let filter = BookFilter::new()
            .and(Predicate::new(
                BookField::AgeDays,
                Operator::Greater,
                FilterValue::Integer(30),
            ))
            .resolve(today)?;
        let found = InMemoryBookRepository.find_by_filter(&mut con, &filter).await?;
        assert_eq!(found, vec![old]);
        Ok(())
    }

    #[tokio::test]
    async fn publisher_and_author_views() -> error_stack::Result<(), KernelError> {
        let today = date!(2024 - 03 - 31);
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let house = Partner::new(PartnerId::new(Uuid::new_v4()), PartnerName::new("House"), None);
        let writer = Partner::new(PartnerId::new(Uuid::new_v4()), PartnerName::new("Writer"), None);
        InMemoryPartnerRepository.create(&mut con, &house).await?;
        InMemoryPartnerRepository.create(&mut con, &writer).await?;

        let mut published = book("Published", 10, None);
        published.apply(
            BookUpdate {
                publisher: Some(Some(house.id().clone())),
                authors: Some(BookAuthors::new([writer.id().clone()])),
                ..Default::default()
            },
            today,
        )?;
        InMemoryBookRepository.create(&mut con, &published).await?;
        InMemoryBookRepository
            .create(&mut con, &book("Unrelated", 10, None))
            .await?;

        let by_house = InMemoryBookRepository
            .find_by_publisher(&mut con, house.id())
            .await?;
        assert_eq!(by_house, vec![published.clone()]);
        let by_writer = InMemoryBookRepository
            .find_by_author(&mut con, writer.id())
            .await?;
        assert_eq!(by_writer, vec![published]);
        let by_house_as_author = InMemoryBookRepository
            .find_by_author(&mut con, house.id())
            .await?;
        assert!(by_house_as_author.is_empty());
        Ok(())
    }
}
