use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use kernel::interface::search::{BookField, FilterValue, Operator, Predicate};
use kernel::prelude::entity::{
    AgeDays, Book, BookAuthors, BookCategoryId, BookCover, BookDescription, BookId, BookNotes,
    BookShortName, BookState, BookTitle, BookUpdate, CostPrice, CurrencyCode, DerivedField,
    DestructBook, DocumentReference, OutOfPrint, PageCount, Partner, PartnerId, ReaderRating,
    RetailPrice,
};
use kernel::KernelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub short_name: String,
    pub display_name: String,
    pub release_date: Option<Date>,
    pub date_updated: Option<Date>,
    pub age_days: i64,
    pub state: String,
    pub page_count: i32,
    pub authors: Vec<Uuid>,
    pub publisher: Option<Uuid>,
    pub publisher_city: Option<String>,
    pub notes: Option<String>,
    pub description: Option<String>,
    pub cover: Option<Vec<u8>>,
    pub out_of_print: bool,
    pub retail_price: Option<RetailPriceDto>,
    pub cost_price: Option<i64>,
    pub reader_rating: Option<f64>,
    pub category: Option<Uuid>,
    pub reference: Option<String>,
    pub active: bool,
}

impl BookDto {
    /// `publisher` is only used for the city projection; pass the partner
    /// the book points at, if it was loaded.
    pub fn new(book: Book, today: Date, publisher: Option<&Partner>) -> Self {
        let age_days = AgeDays::get(&book, today);
        let display_name = book.display_name();
        let publisher_city = publisher
            .and_then(|partner| book.publisher_city(partner))
            .map(|city| String::from(city.clone()));
        let DestructBook {
            id,
            title,
            short_name,
            release_date,
            date_updated,
            page_count,
            state,
            authors,
            publisher,
            notes,
            description,
            cover,
            out_of_print,
            retail_price,
            cost_price,
            reader_rating,
            category,
            reference,
            archive,
        } = book.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            short_name: short_name.into(),
            display_name,
            release_date: release_date.map(Date::from),
            date_updated: date_updated.map(Date::from),
            age_days: age_days.into(),
            state: state.as_str().to_owned(),
            page_count: page_count.into(),
            authors: Vec::<PartnerId>::from(authors)
                .into_iter()
                .map(Uuid::from)
                .collect(),
            publisher: publisher.map(Uuid::from),
            publisher_city,
            notes: notes.map(String::from),
            description: description.map(String::from),
            cover: cover.map(Vec::<u8>::from),
            out_of_print: out_of_print.into(),
            retail_price: retail_price.map(RetailPriceDto::from),
            cost_price: cost_price.map(i64::from),
            reader_rating: reader_rating.map(|rating| rating.as_f64()),
            category: category.map(Uuid::from),
            reference: reference.map(|reference| reference.to_string()),
            active: archive.is_active(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailPriceDto {
    pub amount: i64,
    pub currency: String,
}

impl From<RetailPrice> for RetailPriceDto {
    fn from(value: RetailPrice) -> Self {
        let currency: &String = value.currency().as_ref();
        Self {
            amount: *value.amount(),
            currency: currency.clone(),
        }
    }
}

impl From<RetailPriceDto> for RetailPrice {
    fn from(value: RetailPriceDto) -> Self {
        RetailPrice::new(value.amount, CurrencyCode::new(value.currency))
    }
}

pub struct GetBookDto {
    pub id: Uuid,
}

pub struct CreateBookDto {
    pub title: String,
    pub short_name: String,
    pub page_count: i32,
    pub release_date: Option<Date>,
    pub authors: Vec<Uuid>,
    pub publisher: Option<Uuid>,
}

/// `None` leaves a field untouched, `Some(None)` clears it. `age_days` is
/// written after every other field.
#[derive(Debug, Clone, Default)]
pub struct UpdateBookDto {
    pub id: Uuid,
    pub title: Option<String>,
    pub short_name: Option<String>,
    pub release_date: Option<Option<Date>>,
    pub age_days: Option<i64>,
    pub page_count: Option<i32>,
    pub authors: Option<Vec<Uuid>>,
    pub publisher: Option<Option<Uuid>>,
    pub notes: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub cover: Option<Option<Vec<u8>>>,
    pub out_of_print: Option<bool>,
    pub retail_price: Option<Option<RetailPriceDto>>,
    pub cost_price: Option<Option<i64>>,
    pub reader_rating: Option<Option<f64>>,
    pub category: Option<Option<Uuid>>,
    pub reference: Option<Option<String>>,
}

impl UpdateBookDto {
    pub(crate) fn into_parts(
        self,
    ) -> error_stack::Result<(BookId, BookUpdate, Option<AgeDays>), KernelError> {
        let reference = self
            .reference
            .map(|reference| {
                reference
                    .map(|reference| reference.parse::<DocumentReference>())
                    .transpose()
            })
            .transpose()?;
        let reader_rating = self
            .reader_rating
            .map(|rating| rating.map(ReaderRating::from_f64).transpose())
            .transpose()?;
        let update = BookUpdate {
            title: self.title.map(BookTitle::new),
            short_name: self.short_name.map(BookShortName::new),
            release_date: self.release_date,
            page_count: self.page_count.map(PageCount::new),
            authors: self
                .authors
                .map(|authors| BookAuthors::new(authors.into_iter().map(PartnerId::new))),
            publisher: self
                .publisher
                .map(|publisher| publisher.map(PartnerId::new)),
            notes: self.notes.map(|notes| notes.map(BookNotes::new)),
            description: self
                .description
                .map(|description| description.map(BookDescription::new)),
            cover: self.cover.map(|cover| cover.map(BookCover::new)),
            out_of_print: self.out_of_print.map(OutOfPrint::new),
            retail_price: self
                .retail_price
                .map(|price| price.map(RetailPrice::from)),
            cost_price: self.cost_price.map(|cost| cost.map(CostPrice::new)),
            reader_rating,
            category: self
                .category
                .map(|category| category.map(BookCategoryId::new)),
            reference,
        };
        Ok((BookId::new(self.id), update, self.age_days.map(AgeDays::new)))
    }
}

/// Target state by storage key (`draft`, `available`, `borrowed`, `lost`).
pub struct ChangeBookStateDto {
    pub ids: Vec<Uuid>,
    pub state: String,
}

pub struct BookBatchDto {
    pub ids: Vec<Uuid>,
}

pub struct ArchiveBookDto {
    pub id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct SearchBookDto {
    pub predicates: Vec<PredicateDto>,
    pub include_archived: bool,
}

/// `field` and `operator` use their textual forms, e.g. `age_days` and `>`.
#[derive(Debug, Clone)]
pub struct PredicateDto {
    pub field: String,
    pub operator: String,
    pub value: FilterValueDto,
}

#[derive(Debug, Clone)]
pub enum FilterValueDto {
    Text(String),
    Date(Date),
    Integer(i64),
    State(String),
    Partner(Uuid),
}

impl TryFrom<PredicateDto> for Predicate {
    type Error = error_stack::Report<KernelError>;
    fn try_from(value: PredicateDto) -> Result<Self, Self::Error> {
        let field = value.field.parse::<BookField>()?;
        let operator = value.operator.parse::<Operator>()?;
        let value = match value.value {
            FilterValueDto::Text(text) => FilterValue::Text(text),
            FilterValueDto::Date(date) => FilterValue::Date(date),
            FilterValueDto::Integer(number) => FilterValue::Integer(number),
            FilterValueDto::State(state) => FilterValue::State(state.parse::<BookState>()?),
            FilterValueDto::Partner(id) => FilterValue::Partner(PartnerId::new(id)),
        };
        Ok(Predicate::new(field, operator, value))
    }
}
