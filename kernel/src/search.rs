use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};
use time::Date;
use vodca::References;

use crate::entity::{AgeDays, Book, BookState, DerivedField, PartnerId};
use crate::KernelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
        }
    }

    pub fn is_ordering(&self) -> bool {
        !matches!(self, Operator::Equal | Operator::NotEqual)
    }

    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering.is_eq(),
            Operator::NotEqual => ordering.is_ne(),
            Operator::Less => ordering.is_lt(),
            Operator::LessOrEqual => ordering.is_le(),
            Operator::Greater => ordering.is_gt(),
            Operator::GreaterOrEqual => ordering.is_ge(),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::Equal),
            "!=" | "<>" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::Less),
            "<=" => Ok(Operator::LessOrEqual),
            ">" => Ok(Operator::Greater),
            ">=" => Ok(Operator::GreaterOrEqual),
            other => Err(Report::new(KernelError::Validation)
                .attach_printable(format!("unsupported operator `{other}`"))),
        }
    }
}

/// Filterable book attributes, stored or derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookField {
    Title,
    ReleaseDate,
    PageCount,
    State,
    Publisher,
    AgeDays,
}

impl FromStr for BookField {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(BookField::Title),
            "release_date" => Ok(BookField::ReleaseDate),
            "page_count" => Ok(BookField::PageCount),
            "state" => Ok(BookField::State),
            "publisher" => Ok(BookField::Publisher),
            "age_days" => Ok(BookField::AgeDays),
            other => Err(Report::new(KernelError::Validation)
                .attach_printable(format!("book field `{other}` is not searchable"))),
        }
    }
}

/// Columns a storage driver can compare against directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredField {
    Title,
    ReleaseDate,
    PageCount,
    State,
    Publisher,
}

impl StoredField {
    pub fn column(&self) -> &'static str {
        match self {
            StoredField::Title => "title",
            StoredField::ReleaseDate => "release_date",
            StoredField::PageCount => "page_count",
            StoredField::State => "state",
            StoredField::Publisher => "publisher_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    Date(Date),
    Integer(i64),
    State(BookState),
    Partner(PartnerId),
}

#[derive(Debug, Clone, PartialEq, Eq, References)]
pub struct Predicate {
    field: BookField,
    operator: Operator,
    value: FilterValue,
}

impl Predicate {
    pub fn new(field: BookField, operator: Operator, value: FilterValue) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    fn resolve(&self, today: Date) -> error_stack::Result<StoredPredicate, KernelError> {
        let stored = match self.field {
            BookField::Title => StoredField::Title,
            BookField::ReleaseDate => StoredField::ReleaseDate,
            BookField::PageCount => StoredField::PageCount,
            BookField::State => StoredField::State,
            BookField::Publisher => StoredField::Publisher,
            BookField::AgeDays => {
                let FilterValue::Integer(days) = self.value else {
                    return Err(Report::new(KernelError::Validation)
                        .attach_printable("age_days compares against a number of days"));
                };
                return AgeDays::new(days).to_filter_predicate(self.operator, today);
            }
        };
        StoredPredicate::new(stored, self.operator, self.value.clone())
    }
}

/// Predicate over a stored column. Only constructible with a value of the
/// column's type and an operator the column supports.
#[derive(Debug, Clone, PartialEq, Eq, References)]
pub struct StoredPredicate {
    field: StoredField,
    operator: Operator,
    value: FilterValue,
}

impl StoredPredicate {
    pub fn new(
        field: StoredField,
        operator: Operator,
        value: FilterValue,
    ) -> error_stack::Result<Self, KernelError> {
        let typed = matches!(
            (&field, &value),
            (StoredField::Title, FilterValue::Text(_))
                | (StoredField::ReleaseDate, FilterValue::Date(_))
                | (StoredField::PageCount, FilterValue::Integer(_))
                | (StoredField::State, FilterValue::State(_))
                | (StoredField::Publisher, FilterValue::Partner(_))
        );
        if !typed {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "{value:?} cannot be compared with `{}`",
                field.column()
            )));
        }
        let unordered = matches!(field, StoredField::State | StoredField::Publisher);
        if unordered && operator.is_ordering() {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "`{}` only supports = and !=",
                field.column()
            )));
        }
        Ok(Self {
            field,
            operator,
            value,
        })
    }

    /// Evaluates the predicate against an in-memory record. A missing value
    /// never matches, whatever the operator.
    pub fn matches(&self, book: &Book) -> bool {
        let ordering = match (&self.field, &self.value) {
            (StoredField::Title, FilterValue::Text(text)) => {
                let title: &String = book.title().as_ref();
                Some(title.cmp(text))
            }
            (StoredField::ReleaseDate, FilterValue::Date(date)) => book
                .release_date()
                .as_ref()
                .map(|release_date| {
                    let release_date: &Date = release_date.as_ref();
                    release_date.cmp(date)
                }),
            (StoredField::PageCount, FilterValue::Integer(pages)) => {
                let count: &i32 = book.page_count().as_ref();
                Some(i64::from(*count).cmp(pages))
            }
            (StoredField::State, FilterValue::State(state)) => {
                Some(if book.state() == state {
                    Ordering::Equal
                } else {
                    Ordering::Less
                })
            }
            (StoredField::Publisher, FilterValue::Partner(partner)) => {
                book.publisher().as_ref().map(|publisher| {
                    if publisher == partner {
                        Ordering::Equal
                    } else {
                        Ordering::Less
                    }
                })
            }
            _ => None,
        };
        ordering.map_or(false, |ordering| self.operator.holds(ordering))
    }
}

/// Conjunction of predicates, possibly over derived fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, References)]
pub struct BookFilter {
    predicates: Vec<Predicate>,
    include_archived: bool,
}

impl BookFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn with_archived(mut self) -> Self {
        self.include_archived = true;
        self
    }

    /// Rewrites derived-field predicates into stored-column predicates so any
    /// storage driver can evaluate the result.
    pub fn resolve(&self, today: Date) -> error_stack::Result<StoredFilter, KernelError> {
        let predicates = self
            .predicates
            .iter()
            .map(|predicate| predicate.resolve(today))
            .collect::<error_stack::Result<Vec<_>, KernelError>>()?;
        Ok(StoredFilter {
            predicates,
            include_archived: self.include_archived,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, References)]
pub struct StoredFilter {
    predicates: Vec<StoredPredicate>,
    include_archived: bool,
}

impl StoredFilter {
    pub fn matches(&self, book: &Book) -> bool {
        (self.include_archived || book.archive().is_active())
            && self.predicates.iter().all(|predicate| predicate.matches(book))
    }
}
