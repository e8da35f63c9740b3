use std::collections::HashMap;

use error_stack::Report;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use time::Date;
use uuid::Uuid;

use kernel::interface::query::BookQuery;
use kernel::interface::search::{FilterValue, StoredFilter};
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{
    Archive, Book, BookAuthors, BookCategoryId, BookCover, BookDescription, BookId, BookNotes,
    BookShortName, BookState, BookTitle, CostPrice, CurrencyCode, DateUpdated, DocumentReference,
    OutOfPrint, PageCount, PartnerId, ReaderRating, ReleaseDate, RetailPrice,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con.connection(), id).await
    }

    async fn find_by_title(
        &self,
        con: &mut PostgresTransaction,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_title(con.connection(), title).await
    }

    async fn find_by_filter(
        &self,
        con: &mut PostgresTransaction,
        filter: &StoredFilter,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_by_filter(con.connection(), filter).await
    }

    async fn find_by_publisher(
        &self,
        con: &mut PostgresTransaction,
        publisher: &PartnerId,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_by_publisher(con.connection(), publisher).await
    }

    async fn find_by_author(
        &self,
        con: &mut PostgresTransaction,
        author: &PartnerId,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_by_author(con.connection(), author).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::create(con.connection(), book).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::update(con.connection(), book).await
    }
}

// language=postgresql
const SELECT_BOOKS: &str = r#"
    SELECT id, title, short_name, release_date, date_updated, page_count, state, publisher_id,
           notes, description, cover, out_of_print, retail_amount, retail_currency, cost_amount,
           (reader_rating * 10000)::BIGINT AS reader_rating, category_id, reference, active
    FROM books
    "#;

/// Titles compare bytewise, the same as `Book::listing_order`.
const ORDER_BOOKS: &str = r#" ORDER BY release_date DESC NULLS LAST, title COLLATE "C""#;

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    short_name: String,
    release_date: Option<Date>,
    date_updated: Option<Date>,
    page_count: i32,
    state: String,
    publisher_id: Option<Uuid>,
    notes: Option<String>,
    description: Option<String>,
    cover: Option<Vec<u8>>,
    out_of_print: bool,
    retail_amount: Option<i64>,
    retail_currency: Option<String>,
    cost_amount: Option<i64>,
    reader_rating: Option<i64>,
    category_id: Option<Uuid>,
    reference: Option<String>,
    active: bool,
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    book_id: Uuid,
    partner_id: Uuid,
}

impl BookRow {
    fn into_book(self, authors: Vec<PartnerId>) -> error_stack::Result<Book, KernelError> {
        let state = self.state.parse::<BookState>()?;
        let reference = self
            .reference
            .map(|reference| reference.parse::<DocumentReference>())
            .transpose()?;
        let retail_price = match (self.retail_amount, self.retail_currency) {
            (Some(amount), Some(currency)) => {
                Some(RetailPrice::new(amount, CurrencyCode::new(currency)))
            }
            _ => None,
        };
        let mut book = Book::new(
            BookId::new(self.id),
            BookTitle::new(self.title),
            BookShortName::new(self.short_name),
            PageCount::new(self.page_count),
            self.release_date.map(ReleaseDate::new),
        );
        book.substitute(|book| {
            *book.date_updated = self.date_updated.map(DateUpdated::new);
            *book.state = state;
            *book.authors = BookAuthors::new(authors);
            *book.publisher = self.publisher_id.map(PartnerId::new);
            *book.notes = self.notes.map(BookNotes::new);
            *book.description = self.description.map(BookDescription::new);
            *book.cover = self.cover.map(BookCover::new);
            *book.out_of_print = OutOfPrint::new(self.out_of_print);
            *book.retail_price = retail_price;
            *book.cost_price = self.cost_amount.map(CostPrice::new);
            *book.reader_rating = self.reader_rating.map(ReaderRating::new);
            *book.category = self.category_id.map(BookCategoryId::new);
            *book.reference = reference;
            *book.archive = Archive::new(self.active);
        });
        Ok(book)
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let id: &Uuid = id.as_ref();
        let row = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOKS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *con)
            .await
            .convert_error()?;
        Ok(Self::attach_authors(con, row.into_iter().collect())
            .await?
            .pop())
    }

    async fn find_by_title(
        con: &mut PgConnection,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let title: &String = title.as_ref();
        let row = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOKS} WHERE title = $1"))
            .bind(title)
            .fetch_optional(&mut *con)
            .await
            .convert_error()?;
        Ok(Self::attach_authors(con, row.into_iter().collect())
            .await?
            .pop())
    }

    async fn find_by_filter(
        con: &mut PgConnection,
        filter: &StoredFilter,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_BOOKS);
        builder.push(" WHERE TRUE");
        if !filter.include_archived() {
            builder.push(" AND active");
        }
        for predicate in filter.predicates() {
            builder
                .push(" AND ")
                .push(predicate.field().column())
                .push(" ")
                .push(predicate.operator().as_str())
                .push(" ");
            match predicate.value() {
                FilterValue::Text(text) => builder.push_bind(text.clone()),
                FilterValue::Date(date) => builder.push_bind(*date),
                FilterValue::Integer(value) => builder.push_bind(*value),
                FilterValue::State(state) => builder.push_bind(state.as_str()),
                FilterValue::Partner(partner) => {
                    let partner: &Uuid = partner.as_ref();
                    builder.push_bind(*partner)
                }
            };
        }
        builder.push(ORDER_BOOKS);
        tracing::debug!("book filter: {}", builder.sql());
        let rows = builder
            .build_query_as::<BookRow>()
            .fetch_all(&mut *con)
            .await
            .convert_error()?;
        Self::attach_authors(con, rows).await
    }

    async fn find_by_publisher(
        con: &mut PgConnection,
        publisher: &PartnerId,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let publisher: &Uuid = publisher.as_ref();
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "{SELECT_BOOKS} WHERE publisher_id = $1{ORDER_BOOKS}"
        ))
        .bind(publisher)
        .fetch_all(&mut *con)
        .await
        .convert_error()?;
        Self::attach_authors(con, rows).await
    }

    async fn find_by_author(
        con: &mut PgConnection,
        author: &PartnerId,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let author: &Uuid = author.as_ref();
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "{SELECT_BOOKS} WHERE id IN (SELECT book_id FROM book_authors WHERE partner_id = $1){ORDER_BOOKS}"
        ))
        .bind(author)
        .fetch_all(&mut *con)
        .await
        .convert_error()?;
        Self::attach_authors(con, rows).await
    }

    async fn attach_authors(
        con: &mut PgConnection,
        rows: Vec<BookRow>,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        // language=postgresql
        let author_rows = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT book_id, partner_id
            FROM book_authors
            WHERE book_id = ANY($1)
            ORDER BY position
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *con)
        .await
        .convert_error()?;
        let mut authors: HashMap<Uuid, Vec<PartnerId>> = HashMap::new();
        for row in author_rows {
            authors
                .entry(row.book_id)
                .or_default()
                .push(PartnerId::new(row.partner_id));
        }
        rows.into_iter()
            .map(|row| {
                let book_authors = authors.remove(&row.id).unwrap_or_default();
                row.into_book(book_authors)
            })
            .collect()
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let query = sqlx::query(
            r#"
            INSERT INTO books (id, title, short_name, release_date, date_updated, page_count, state,
                               publisher_id, notes, description, cover, out_of_print,
                               retail_amount, retail_currency, cost_amount, reader_rating,
                               category_id, reference, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16::BIGINT / 10000.0, $17, $18, $19)
            "#,
        );
        Self::bind_columns(query, book)
            .execute(&mut *con)
            .await
            .convert_error()?;
        Self::replace_authors(con, book).await
    }

    async fn update(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let query = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, short_name = $3, release_date = $4, date_updated = $5,
                page_count = $6, state = $7, publisher_id = $8, notes = $9, description = $10,
                cover = $11, out_of_print = $12, retail_amount = $13, retail_currency = $14,
                cost_amount = $15, reader_rating = $16::BIGINT / 10000.0, category_id = $17,
                reference = $18, active = $19
            WHERE id = $1
            "#,
        );
        let result = Self::bind_columns(query, book)
            .execute(&mut *con)
            .await
            .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("book {:?}", book.id())));
        }
        Self::replace_authors(con, book).await
    }

    fn bind_columns<'q>(
        query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
        book: &'q Book,
    ) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
        let release_date: Option<&Date> = book.release_date().as_ref().map(|date| date.as_ref());
        let date_updated: Option<&Date> = book.date_updated().as_ref().map(|date| date.as_ref());
        let notes: Option<&String> = book.notes().as_ref().map(|notes| notes.as_ref());
        let description: Option<&String> = book
            .description()
            .as_ref()
            .map(|description| description.as_ref());
        let cover: Option<&Vec<u8>> = book.cover().as_ref().map(|cover| cover.as_ref());
        let publisher: Option<&Uuid> = book.publisher().as_ref().map(|id| id.as_ref());
        let retail_amount: Option<i64> = book.retail_price().as_ref().map(|price| *price.amount());
        let retail_currency: Option<&String> = book
            .retail_price()
            .as_ref()
            .map(|price| price.currency().as_ref());
        let cost_amount: Option<&i64> = book.cost_price().as_ref().map(|cost| cost.as_ref());
        let reader_rating: Option<&i64> = book
            .reader_rating()
            .as_ref()
            .map(|rating| rating.as_ref());
        let category: Option<&Uuid> = book.category().as_ref().map(|id| id.as_ref());
        let out_of_print: &bool = book.out_of_print().as_ref();
        let page_count: &i32 = book.page_count().as_ref();
        let id: &Uuid = book.id().as_ref();
        let title: &String = book.title().as_ref();
        let short_name: &String = book.short_name().as_ref();
        query
            .bind(id)
            .bind(title)
            .bind(short_name)
            .bind(release_date)
            .bind(date_updated)
            .bind(page_count)
            .bind(book.state().as_str())
            .bind(publisher)
            .bind(notes)
            .bind(description)
            .bind(cover)
            .bind(out_of_print)
            .bind(retail_amount)
            .bind(retail_currency)
            .bind(cost_amount)
            .bind(reader_rating)
            .bind(category)
            .bind(book.reference().as_ref().map(|reference| reference.to_string()))
            .bind(book.archive().is_active())
    }

    async fn replace_authors(
        con: &mut PgConnection,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        let book_id: &Uuid = book.id().as_ref();
        // language=postgresql
        sqlx::query(
            r#"
            DELETE FROM book_authors
            WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .execute(&mut *con)
        .await
        .convert_error()?;
        for (position, author) in book.authors().iter().enumerate() {
            let author: &Uuid = author.as_ref();
            let position = i32::try_from(position)
                .map_err(|error| Report::new(error).change_context(KernelError::Internal))?;
            // language=postgresql
            sqlx::query(
                r#"
                INSERT INTO book_authors (book_id, partner_id, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(book_id)
            .bind(author)
            .bind(position)
            .execute(&mut *con)
            .await
            .convert_error()?;
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
        Book, BookAuthors, BookCategoryId, BookId, BookShortName, BookTitle, BookUpdate,
        CostPrice, CurrencyCode, PageCount, Partner, PartnerId, PartnerName, ReaderRating,
        ReleaseDate, RetailPrice,
    };
    use kernel::KernelError;

    use crate::database::{PostgresBookRepository, PostgresDatabase, PostgresPartnerRepository};

    fn book(pages: i32, release_date: Option<ReleaseDate>) -> Book {
        titled(format!("test-{}", Uuid::new_v4()), pages, release_date)
    }

    fn titled(title: String, pages: i32, release_date: Option<ReleaseDate>) -> Book {
        Book::new(
            BookId::new(Uuid::new_v4()),
            BookTitle::new(title),
            BookShortName::new("test"),
            PageCount::new(pages),
            release_date,
        )
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut con = db.transact().await?;
        let today = date!(2024 - 03 - 31);

        let author = Partner::new(PartnerId::new(Uuid::new_v4()), PartnerName::new("author"), None);
        PostgresPartnerRepository.create(&mut con, &author).await?;

        let mut created = book(120, Some(ReleaseDate::new(date!(2020 - 01 - 01))));
        created.apply(
            BookUpdate {
                authors: Some(BookAuthors::new([author.id().clone()])),
                retail_price: Some(Some(RetailPrice::new(1999, CurrencyCode::new("eur")))),
                cost_price: Some(Some(CostPrice::new(850))),
                reader_rating: Some(Some(ReaderRating::from_f64(4.3125)?)),
                category: Some(Some(BookCategoryId::new(Uuid::new_v4()))),
                ..Default::default()
            },
            today,
        )?;
        PostgresBookRepository.create(&mut con, &created).await?;

        let found = PostgresBookRepository.find_by_id(&mut con, created.id()).await?;
        assert_eq!(found, Some(created.clone()));

        created.apply(
            BookUpdate {
                title: Some(BookTitle::new(format!("test-{}", Uuid::new_v4()))),
                ..Default::default()
            },
            today,
        )?;
        PostgresBookRepository.update(&mut con, &created).await?;
        let found = PostgresBookRepository
            .find_by_title(&mut con, created.title())
            .await?;
        assert_eq!(found, Some(created.clone()));

        let by_author = PostgresBookRepository
            .find_by_author(&mut con, author.id())
            .await?;
        assert_eq!(by_author, vec![created.clone()]);

        let title: &String = created.title().as_ref();
        let filter = BookFilter::new()
            .and(Predicate::new(
                BookField::Title,
                Operator::Equal,
                FilterValue::Text(title.clone()),
            ))
            .and(Predicate::new(
                BookField::AgeDays,
                Operator::GreaterOrEqual,
                FilterValue::Integer(30),
            ))
            .resolve(today)?;
        let filtered = PostgresBookRepository.find_by_filter(&mut con, &filter).await?;
        assert_eq!(filtered, vec![created]);

        con.roll_back().await?;
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn constraints() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;

        let mut con = db.transact().await?;
        let error = PostgresBookRepository
            .create(&mut con, &book(0, None))
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::PositiveValueViolation);
        con.roll_back().await?;

        let mut con = db.transact().await?;
        let original = book(10, None);
        PostgresBookRepository.create(&mut con, &original).await?;
        let duplicate = Book::new(
            BookId::new(Uuid::new_v4()),
            original.title().clone(),
            BookShortName::new("duplicate"),
            PageCount::new(10),
            None,
        );
        let error = PostgresBookRepository
            .create(&mut con, &duplicate)
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::UniquenessViolation);
        con.roll_back().await?;
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn titles_sort_bytewise() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut con = db.transact().await?;

        let publisher = Partner::new(
            PartnerId::new(Uuid::new_v4()),
            PartnerName::new("publisher"),
            None,
        );
        PostgresPartnerRepository.create(&mut con, &publisher).await?;

        let suffix = Uuid::new_v4();
        let mut books = vec![
            titled(format!("alpha-{suffix}"), 10, None),
            titled(format!("Zeta-{suffix}"), 10, None),
            titled(format!("beta-{suffix}"), 10, None),
        ];
        for book in books.iter_mut() {
            book.substitute(|book| *book.publisher = Some(publisher.id().clone()));
            PostgresBookRepository.create(&mut con, book).await?;
        }

        let listed = PostgresBookRepository
            .find_by_publisher(&mut con, publisher.id())
            .await?;
        books.sort_by(Book::listing_order);
        assert_eq!(listed, books);
        let first: &String = listed[0].title().as_ref();
        assert!(first.starts_with("Zeta"));

        con.roll_back().await?;
        Ok(())
    }
}
