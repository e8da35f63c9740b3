use error_stack::Report;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};
use vodca::{AsRefln, Fromln};

use crate::entity::{Book, BookUpdate, ReleaseDate};
use crate::search::{FilterValue, Operator, StoredField, StoredPredicate};
use crate::KernelError;

/// Accessor contract for an attribute that is not stored but can still be
/// read, written and filtered on.
pub trait DerivedField {
    type Entity;

    /// Compute the value from the entity's stored attributes.
    fn get(entity: &Self::Entity, today: Date) -> Self;

    /// Write the value back through the stored attributes it derives from.
    fn set(&self, entity: &mut Self::Entity, today: Date) -> error_stack::Result<(), KernelError>;

    /// Translate `field <operator> self` into a predicate over stored columns.
    fn to_filter_predicate(
        &self,
        operator: Operator,
        today: Date,
    ) -> error_stack::Result<StoredPredicate, KernelError>;
}

/// Days elapsed since the release date, `0` for books without one.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Fromln, AsRefln,
)]
pub struct AgeDays(i64);

impl AgeDays {
    pub fn new(days: impl Into<i64>) -> Self {
        Self(days.into())
    }

    pub fn since(release_date: Option<&ReleaseDate>, today: Date) -> Self {
        match release_date {
            Some(date) => {
                let released: &Date = date.as_ref();
                Self((today - *released).whole_days())
            }
            None => Self(0),
        }
    }

    /// The date that is `self` days before `today`.
    fn date_before(&self, today: Date) -> error_stack::Result<Date, KernelError> {
        today
            .checked_sub(Duration::days(self.0))
            .ok_or_else(|| {
                Report::new(KernelError::Validation)
                    .attach_printable(format!("age of {} days is out of the date range", self.0))
            })
    }
}

impl DerivedField for AgeDays {
    type Entity = Book;

    fn get(entity: &Book, today: Date) -> Self {
        Self::since(entity.release_date().as_ref(), today)
    }

    /// Books without a release date are left untouched: the age can only be
    /// inverted relative to an existing date.
    fn set(&self, entity: &mut Book, today: Date) -> error_stack::Result<(), KernelError> {
        if entity.release_date().is_none() {
            return Ok(());
        }
        let date = self.date_before(today)?;
        entity.apply(
            BookUpdate {
                release_date: Some(Some(date)),
                ..Default::default()
            },
            today,
        )
    }

    fn to_filter_predicate(
        &self,
        operator: Operator,
        today: Date,
    ) -> error_stack::Result<StoredPredicate, KernelError> {
        // age and date move in opposite directions
        let operator = match operator {
            Operator::Greater => Operator::Less,
            Operator::GreaterOrEqual => Operator::LessOrEqual,
            Operator::Less => Operator::Greater,
            Operator::LessOrEqual => Operator::GreaterOrEqual,
            other => other,
        };
        let date = self.date_before(today)?;
        StoredPredicate::new(StoredField::ReleaseDate, operator, FilterValue::Date(date))
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use super::{AgeDays, DerivedField};
    use crate::entity::{Book, BookId, BookShortName, BookTitle, PageCount, ReleaseDate};
    use crate::search::{FilterValue, Operator, StoredField};

    fn book(release_date: Option<ReleaseDate>) -> Book {
        Book::new(
            BookId::new(Uuid::new_v4()),
            BookTitle::new("Dune"),
            BookShortName::new("Dune"),
            PageCount::new(412),
            release_date,
        )
    }

    #[test]
    fn computes_days_since_release() {
        let today = date!(2024 - 03 - 01);
        let dated = book(Some(ReleaseDate::new(date!(2024 - 01 - 31))));
        assert_eq!(AgeDays::get(&dated, today), AgeDays::new(30));
        assert_eq!(AgeDays::get(&book(None), today), AgeDays::new(0));
    }

    #[test]
    fn inverse_moves_release_date() {
        let today = date!(2024 - 03 - 01);
        let mut dated = book(Some(ReleaseDate::new(date!(2020 - 01 - 01))));
        AgeDays::new(10).set(&mut dated, today).unwrap();
        assert_eq!(
            dated.release_date(),
            &Some(ReleaseDate::new(date!(2024 - 02 - 20)))
        );
        assert_eq!(AgeDays::get(&dated, today), AgeDays::new(10));
    }

    #[test]
    fn inverse_skips_books_without_release_date() {
        let today = date!(2024 - 03 - 01);
        let mut undated = book(None);
        AgeDays::new(10).set(&mut undated, today).unwrap();
        assert_eq!(undated.release_date(), &None);
        assert_eq!(AgeDays::get(&undated, today), AgeDays::new(0));
    }

    #[test]
    fn negative_age_would_release_in_future() {
        let today = date!(2024 - 03 - 01);
        let mut dated = book(Some(ReleaseDate::new(date!(2020 - 01 - 01))));
        assert!(AgeDays::new(-1).set(&mut dated, today).is_err());
        assert_eq!(
            dated.release_date(),
            &Some(ReleaseDate::new(date!(2020 - 01 - 01)))
        );
    }

    #[test]
    fn search_mirrors_ordering_operators() {
        let today = date!(2024 - 03 - 31);
        let cases = [
            (Operator::Greater, Operator::Less),
            (Operator::GreaterOrEqual, Operator::LessOrEqual),
            (Operator::Less, Operator::Greater),
            (Operator::LessOrEqual, Operator::GreaterOrEqual),
            (Operator::Equal, Operator::Equal),
            (Operator::NotEqual, Operator::NotEqual),
        ];
        for (requested, translated) in cases {
            let predicate = AgeDays::new(30).to_filter_predicate(requested, today).unwrap();
            assert_eq!(predicate.field(), &StoredField::ReleaseDate);
            assert_eq!(predicate.operator(), &translated);
            assert_eq!(predicate.value(), &FilterValue::Date(date!(2024 - 03 - 01)));
        }
    }
}
