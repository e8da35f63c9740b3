mod age;
mod authors;
mod category;
mod content;
mod id;
mod page_count;
mod price;
mod rating;
mod release_date;
mod schema;
mod state;
mod title;
mod updated;

pub use self::{
    age::*, authors::*, category::*, content::*, id::*, page_count::*, price::*, rating::*,
    release_date::*, schema::*, state::*, title::*, updated::*,
};

use std::cmp::Ordering;

use destructure::{Destructure, Mutation};
use error_stack::Report;
use time::Date;
use vodca::References;

use crate::entity::{Archive, DocumentReference, Partner, PartnerCity, PartnerId};
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    short_name: BookShortName,
    release_date: Option<ReleaseDate>,
    date_updated: Option<DateUpdated>,
    page_count: PageCount,
    state: BookState,
    authors: BookAuthors,
    publisher: Option<PartnerId>,
    notes: Option<BookNotes>,
    description: Option<BookDescription>,
    cover: Option<BookCover>,
    out_of_print: OutOfPrint,
    retail_price: Option<RetailPrice>,
    cost_price: Option<CostPrice>,
    reader_rating: Option<ReaderRating>,
    category: Option<BookCategoryId>,
    reference: Option<DocumentReference>,
    archive: Archive,
}

/// Field writes. `None` leaves a field as is; `Some(None)` clears an
/// optional field. `date_updated` is not writable; applying any write
/// stamps it.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BookUpdate {
    pub title: Option<BookTitle>,
    pub short_name: Option<BookShortName>,
    pub release_date: Option<Option<Date>>,
    pub page_count: Option<PageCount>,
    pub authors: Option<BookAuthors>,
    pub publisher: Option<Option<PartnerId>>,
    pub notes: Option<Option<BookNotes>>,
    pub description: Option<Option<BookDescription>>,
    pub cover: Option<Option<BookCover>>,
    pub out_of_print: Option<OutOfPrint>,
    pub retail_price: Option<Option<RetailPrice>>,
    pub cost_price: Option<Option<CostPrice>>,
    pub reader_rating: Option<Option<ReaderRating>>,
    pub category: Option<Option<BookCategoryId>>,
    pub reference: Option<Option<DocumentReference>>,
}

impl Book {
    /// Builds a book in its initial state without validating anything.
    pub fn new(
        id: BookId,
        title: BookTitle,
        short_name: BookShortName,
        page_count: PageCount,
        release_date: Option<ReleaseDate>,
    ) -> Self {
        Self {
            id,
            title,
            short_name,
            release_date,
            date_updated: None,
            page_count,
            state: BookState::default(),
            authors: BookAuthors::default(),
            publisher: None,
            notes: None,
            description: None,
            cover: None,
            out_of_print: OutOfPrint::default(),
            retail_price: None,
            cost_price: None,
            reader_rating: None,
            category: None,
            reference: None,
            archive: Archive::default(),
        }
    }

    /// Write-path constructor; checks required text fields and the release
    /// date against `today`.
    pub fn create(
        id: BookId,
        title: BookTitle,
        short_name: BookShortName,
        page_count: PageCount,
        release_date: Option<Date>,
        today: Date,
    ) -> error_stack::Result<Self, KernelError> {
        ensure_filled("title", title.as_ref())?;
        ensure_filled("short_name", short_name.as_ref())?;
        let release_date = release_date
            .map(|date| ReleaseDate::validated(date, today))
            .transpose()?;
        let mut book = Self::new(id, title, short_name, page_count, release_date);
        book.date_updated = Some(DateUpdated::new(today));
        Ok(book)
    }

    /// Applies every write in `update` or none of them.
    pub fn apply(&mut self, update: BookUpdate, today: Date) -> error_stack::Result<(), KernelError> {
        let writes = [
            ("title", update.title.is_some()),
            ("short_name", update.short_name.is_some()),
            ("release_date", update.release_date.is_some()),
            ("page_count", update.page_count.is_some()),
            ("authors", update.authors.is_some()),
            ("publisher", update.publisher.is_some()),
            ("notes", update.notes.is_some()),
            ("description", update.description.is_some()),
            ("cover", update.cover.is_some()),
            ("out_of_print", update.out_of_print.is_some()),
            ("retail_price", update.retail_price.is_some()),
            ("cost_price", update.cost_price.is_some()),
            ("reader_rating", update.reader_rating.is_some()),
            ("category", update.category.is_some()),
            ("reference", update.reference.is_some()),
        ];
        if writes.iter().all(|(_, written)| !written) {
            return Ok(());
        }
        for (name, _) in writes.iter().filter(|(_, written)| *written) {
            book_field_schema(name)?.ensure_writable(&self.state)?;
        }
        if let Some(title) = &update.title {
            ensure_filled("title", title.as_ref())?;
        }
        if let Some(short_name) = &update.short_name {
            ensure_filled("short_name", short_name.as_ref())?;
        }
        let release_date = update
            .release_date
            .map(|date| date.map(|date| ReleaseDate::validated(date, today)).transpose())
            .transpose()?;

        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(short_name) = update.short_name {
            self.short_name = short_name;
        }
        if let Some(release_date) = release_date {
            self.release_date = release_date;
        }
        if let Some(page_count) = update.page_count {
            self.page_count = page_count;
        }
        if let Some(authors) = update.authors {
            self.authors = authors;
        }
        if let Some(publisher) = update.publisher {
            self.publisher = publisher;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(cover) = update.cover {
            self.cover = cover;
        }
        if let Some(out_of_print) = update.out_of_print {
            self.out_of_print = out_of_print;
        }
        if let Some(retail_price) = update.retail_price {
            self.retail_price = retail_price;
        }
        if let Some(cost_price) = update.cost_price {
            self.cost_price = cost_price;
        }
        if let Some(reader_rating) = update.reader_rating {
            self.reader_rating = reader_rating;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(reference) = update.reference {
            self.reference = reference;
        }
        self.date_updated = Some(DateUpdated::new(today));
        Ok(())
    }

    /// `"<title> (<release_date>)"`, or just the title when the release date
    /// is unknown.
    pub fn display_name(&self) -> String {
        let title: &String = self.title.as_ref();
        match &self.release_date {
            Some(date) => format!("{title} ({date})"),
            None => title.clone(),
        }
    }

    /// Read-only projection of the publisher's city. `None` unless
    /// `publisher` is the partner this book points at.
    pub fn publisher_city<'a>(&self, publisher: &'a Partner) -> Option<&'a PartnerCity> {
        match &self.publisher {
            Some(id) if id == publisher.id() => publisher.city().as_ref(),
            _ => None,
        }
    }

    pub fn is_authored_by(&self, partner: &PartnerId) -> bool {
        self.authors.contains(partner)
    }

    /// Newest release first, undated books last, then by title.
    pub fn listing_order(&self, other: &Self) -> Ordering {
        let by_release = match (&self.release_date, &other.release_date) {
            (Some(left), Some(right)) => right.cmp(left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_release.then_with(|| self.title.cmp(&other.title))
    }
}

fn ensure_filled(name: &str, value: &String) -> error_stack::Result<(), KernelError> {
    let field = book_field_schema(name)?;
    if field.is_required() && value.trim().is_empty() {
        return Err(Report::new(KernelError::Validation)
            .attach_printable(format!("`{}` is required", field.label())));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use super::{
        Book, BookId, BookShortName, BookState, BookTitle, BookUpdate, CostPrice, DateUpdated,
        PageCount, ReaderRating, ReleaseDate,
    };
    use crate::entity::{BookNotes, Partner, PartnerCity, PartnerId, PartnerName};
    use crate::KernelError;

    fn book(title: &str, release_date: Option<ReleaseDate>) -> Book {
        Book::new(
            BookId::new(Uuid::new_v4()),
            BookTitle::new(title),
            BookShortName::new(title),
            PageCount::new(100),
            release_date,
        )
    }

    #[test]
    fn create_rejects_future_release_date() {
        let today = date!(2024 - 03 - 01);
        let error = Book::create(
            BookId::new(Uuid::new_v4()),
            BookTitle::new("Tomorrow"),
            BookShortName::new("Tomorrow"),
            PageCount::new(10),
            Some(date!(2024 - 03 - 02)),
            today,
        )
        .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);

        let created = Book::create(
            BookId::new(Uuid::new_v4()),
            BookTitle::new("Today"),
            BookShortName::new("Today"),
            PageCount::new(10),
            Some(today),
            today,
        )
        .unwrap();
        assert_eq!(created.release_date(), &Some(ReleaseDate::new(today)));
        assert_eq!(created.state(), &BookState::Draft);
        assert_eq!(created.date_updated(), &Some(DateUpdated::new(today)));
    }

    #[test]
    fn short_name_must_not_be_blank() {
        let today = date!(2024 - 03 - 01);
        let error = Book::create(
            BookId::new(Uuid::new_v4()),
            BookTitle::new("Middlemarch"),
            BookShortName::new("  "),
            PageCount::new(10),
            None,
            today,
        )
        .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);

        let mut target = book("Middlemarch", None);
        let update = BookUpdate {
            short_name: Some(BookShortName::new("")),
            ..Default::default()
        };
        let error = target.apply(update, today).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
        assert_eq!(target.short_name(), &BookShortName::new("Middlemarch"));
        assert_eq!(target.date_updated(), &None);
    }

    #[test]
    fn apply_stamps_date_updated() {
        let mut target = book("Persuasion", None);
        target
            .apply(
                BookUpdate {
                    cost_price: Some(Some(CostPrice::new(1250))),
                    ..Default::default()
                },
                date!(2024 - 03 - 01),
            )
            .unwrap();
        assert_eq!(target.date_updated(), &Some(DateUpdated::new(date!(2024 - 03 - 01))));

        target
            .apply(
                BookUpdate {
                    reader_rating: Some(Some(ReaderRating::from_f64(4.25).unwrap())),
                    ..Default::default()
                },
                date!(2024 - 03 - 05),
            )
            .unwrap();
        assert_eq!(target.date_updated(), &Some(DateUpdated::new(date!(2024 - 03 - 05))));
        assert_eq!(target.cost_price(), &Some(CostPrice::new(1250)));

        target
            .apply(BookUpdate::default(), date!(2024 - 03 - 09))
            .unwrap();
        assert_eq!(target.date_updated(), &Some(DateUpdated::new(date!(2024 - 03 - 05))));
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let today = date!(2024 - 03 - 01);
        let mut target = book("Emma", None);
        let update = BookUpdate {
            title: Some(BookTitle::new("Emma, revised")),
            release_date: Some(Some(date!(2030 - 01 - 01))),
            ..Default::default()
        };
        assert!(target.apply(update, today).is_err());
        assert_eq!(target.title(), &BookTitle::new("Emma"));

        let update = BookUpdate {
            title: Some(BookTitle::new("Emma, revised")),
            notes: Some(Some(BookNotes::new("second edition"))),
            ..Default::default()
        };
        target.apply(update, today).unwrap();
        assert_eq!(target.title(), &BookTitle::new("Emma, revised"));
        assert_eq!(target.notes(), &Some(BookNotes::new("second edition")));
    }

    #[test]
    fn page_count_is_frozen_for_lost_books() {
        let today = date!(2024 - 03 - 01);
        let mut lost = book("Lost", None);
        lost.substitute(|book| *book.state = BookState::Lost);
        let update = BookUpdate {
            page_count: Some(PageCount::new(5)),
            ..Default::default()
        };
        let error = lost.apply(update, today).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
        assert_eq!(lost.page_count(), &PageCount::new(100));
    }

    #[test]
    fn display_name_includes_release_date() {
        let dated = book("Dune", Some(ReleaseDate::new(date!(1965 - 08 - 01))));
        assert_eq!(dated.display_name(), "Dune (1965-08-01)");
        assert_eq!(book("Undated", None).display_name(), "Undated");
    }

    #[test]
    fn listing_puts_newest_first_and_undated_last() {
        let mut books = vec![
            book("B", None),
            book("Old", Some(ReleaseDate::new(date!(1990 - 01 - 01)))),
            book("A", None),
            book("New", Some(ReleaseDate::new(date!(2020 - 01 - 01)))),
        ];
        books.sort_by(Book::listing_order);
        let titles: Vec<String> = books
            .into_iter()
            .map(|book| book.into_destruct().title.into())
            .collect();
        assert_eq!(titles, vec!["New", "Old", "A", "B"]);
    }

    #[test]
    fn publisher_city_follows_publisher() {
        let today = date!(2024 - 03 - 01);
        let publisher = Partner::new(
            PartnerId::new(Uuid::new_v4()),
            PartnerName::new("Chilton"),
            Some(PartnerCity::new("Philadelphia")),
        );
        let other = Partner::new(
            PartnerId::new(Uuid::new_v4()),
            PartnerName::new("Ace"),
            Some(PartnerCity::new("New York")),
        );
        let mut dune = book("Dune", None);
        assert_eq!(dune.publisher_city(&publisher), None);
        dune.apply(
            BookUpdate {
                publisher: Some(Some(publisher.id().clone())),
                ..Default::default()
            },
            today,
        )
        .unwrap();
        assert_eq!(
            dune.publisher_city(&publisher),
            Some(&PartnerCity::new("Philadelphia"))
        );
        assert_eq!(dune.publisher_city(&other), None);
    }
}
