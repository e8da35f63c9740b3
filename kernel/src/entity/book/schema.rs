use error_stack::Report;

use crate::entity::BookState;
use crate::KernelError;

/// Static description of one book attribute, checked on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    name: &'static str,
    label: &'static str,
    required: bool,
    stored: bool,
    readonly_in: &'static [BookState],
    help: Option<&'static str>,
}

const NEVER: &[BookState] = &[];
const ALWAYS: &[BookState] = &BookState::ALL;

impl FieldSchema {
    const fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: false,
            stored: true,
            readonly_in: NEVER,
            help: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn derived(mut self) -> Self {
        self.stored = false;
        self
    }

    const fn readonly_in(mut self, states: &'static [BookState]) -> Self {
        self.readonly_in = states;
        self
    }

    const fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_stored(&self) -> bool {
        self.stored
    }

    pub fn help_text(&self) -> Option<&'static str> {
        self.help
    }

    pub fn is_readonly_in(&self, state: &BookState) -> bool {
        self.readonly_in.contains(state)
    }

    pub fn ensure_writable(&self, state: &BookState) -> error_stack::Result<(), KernelError> {
        if self.is_readonly_in(state) {
            return Err(Report::new(KernelError::Validation).attach_printable(format!(
                "`{}` is read-only while the book is {}",
                self.name,
                state.label()
            )));
        }
        Ok(())
    }
}

pub static BOOK_SCHEMA: &[FieldSchema] = &[
    FieldSchema::new("title", "Title").required(),
    FieldSchema::new("short_name", "Short Title").required(),
    FieldSchema::new("release_date", "Release Date"),
    FieldSchema::new("date_updated", "Last Updated").readonly_in(ALWAYS),
    FieldSchema::new("age_days", "Days Since Release").derived(),
    FieldSchema::new("state", "State").required(),
    FieldSchema::new("page_count", "Number of Pages")
        .required()
        .readonly_in(&[BookState::Lost])
        .help("Total book page count"),
    FieldSchema::new("authors", "Authors"),
    FieldSchema::new("publisher", "Publisher"),
    FieldSchema::new("publisher_city", "Publisher City")
        .derived()
        .readonly_in(ALWAYS),
    FieldSchema::new("notes", "Internal Notes"),
    FieldSchema::new("description", "Description"),
    FieldSchema::new("cover", "Book Cover"),
    FieldSchema::new("out_of_print", "Out of Print?"),
    FieldSchema::new("retail_price", "Retail Price"),
    FieldSchema::new("cost_price", "Book Cost"),
    FieldSchema::new("reader_rating", "Reader Average Rating"),
    FieldSchema::new("category", "Category"),
    FieldSchema::new("reference", "Reference Document"),
    FieldSchema::new("active", "Active"),
];

pub fn book_field_schema(name: &str) -> error_stack::Result<&'static FieldSchema, KernelError> {
    BOOK_SCHEMA
        .iter()
        .find(|field| field.name == name)
        .ok_or_else(|| {
            Report::new(KernelError::Internal)
                .attach_printable(format!("book has no field named `{name}`"))
        })
}

#[cfg(test)]
mod test {
    use super::{book_field_schema, BOOK_SCHEMA};
    use crate::entity::BookState;
    use crate::KernelError;

    #[test]
    fn page_count_is_readonly_when_lost() {
        let pages = book_field_schema("page_count").unwrap();
        assert!(pages.ensure_writable(&BookState::Available).is_ok());
        let error = pages.ensure_writable(&BookState::Lost).unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
    }

    #[test]
    fn derived_fields_are_not_stored() {
        let derived: Vec<_> = BOOK_SCHEMA
            .iter()
            .filter(|field| !field.is_stored())
            .map(|field| field.name())
            .collect();
        assert_eq!(derived, vec!["age_days", "publisher_city"]);
    }

    #[test]
    fn publisher_city_is_never_writable() {
        let city = book_field_schema("publisher_city").unwrap();
        assert!(BookState::ALL.iter().all(|state| city.is_readonly_in(state)));
    }

    #[test]
    fn short_name_is_required() {
        let short_name = book_field_schema("short_name").unwrap();
        assert!(short_name.is_required());
        assert_eq!(short_name.label(), "Short Title");
    }

    #[test]
    fn date_updated_is_never_writable() {
        let updated = book_field_schema("date_updated").unwrap();
        assert!(updated.is_stored());
        assert!(BookState::ALL.iter().all(|state| updated.is_readonly_in(state)));
    }

    #[test]
    fn unknown_field_is_internal_error() {
        let error = book_field_schema("isbn").unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Internal);
    }
}
