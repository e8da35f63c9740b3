use error_stack::Report;

use crate::entity::{Book, BookState};
use crate::KernelError;

/// Directed edges of the availability workflow. Nothing leads back to
/// [`BookState::Draft`].
pub const ALLOWED_TRANSITIONS: [(BookState, BookState); 5] = [
    (BookState::Draft, BookState::Available),
    (BookState::Available, BookState::Borrowed),
    (BookState::Available, BookState::Lost),
    (BookState::Borrowed, BookState::Lost),
    (BookState::Lost, BookState::Available),
];

pub fn is_allowed_transition(old: &BookState, new: &BookState) -> bool {
    ALLOWED_TRANSITIONS
        .iter()
        .any(|(from, to)| from == old && to == new)
}

pub trait BookWorkflow {
    fn change_state(&mut self, new_state: BookState) -> error_stack::Result<(), KernelError>;

    fn make_available(&mut self) -> error_stack::Result<(), KernelError> {
        self.change_state(BookState::Available)
    }

    fn make_borrowed(&mut self) -> error_stack::Result<(), KernelError> {
        self.change_state(BookState::Borrowed)
    }

    fn make_lost(&mut self) -> error_stack::Result<(), KernelError> {
        self.change_state(BookState::Lost)
    }
}

impl BookWorkflow for Book {
    fn change_state(&mut self, new_state: BookState) -> error_stack::Result<(), KernelError> {
        let current = *self.state();
        if !is_allowed_transition(&current, &new_state) {
            return Err(Report::new(KernelError::InvalidTransition {
                from: current,
                to: new_state,
            })
            .attach_printable(format!("book {:?}", self.id())));
        }
        self.substitute(|book| *book.state = new_state);
        Ok(())
    }
}

/// Books are processed in slice order and the first rejected transition
/// aborts the batch. Books before it keep their new state; books after it
/// are not touched.
impl BookWorkflow for [Book] {
    fn change_state(&mut self, new_state: BookState) -> error_stack::Result<(), KernelError> {
        for book in self.iter_mut() {
            book.change_state(new_state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use super::{is_allowed_transition, BookWorkflow, ALLOWED_TRANSITIONS};
    use crate::entity::{Book, BookId, BookShortName, BookState, BookTitle, PageCount};
    use crate::KernelError;

    fn book_in(state: BookState) -> Book {
        let mut book = Book::new(
            BookId::new(Uuid::new_v4()),
            BookTitle::new(format!("book-{}", Uuid::new_v4())),
            BookShortName::new("book"),
            PageCount::new(1),
            None,
        );
        book.substitute(|book| *book.state = state);
        book
    }

    #[test]
    fn membership() {
        assert!(is_allowed_transition(&BookState::Draft, &BookState::Available));
        assert!(!is_allowed_transition(&BookState::Draft, &BookState::Lost));
        assert!(is_allowed_transition(&BookState::Lost, &BookState::Available));
        assert!(!is_allowed_transition(&BookState::Available, &BookState::Draft));
        assert!(!is_allowed_transition(&BookState::Borrowed, &BookState::Available));
    }

    #[test]
    fn no_state_loops_onto_itself_or_back_to_draft() {
        for state in BookState::ALL {
            assert!(!is_allowed_transition(&state, &state));
            assert!(!is_allowed_transition(&state, &BookState::Draft));
        }
        assert_eq!(ALLOWED_TRANSITIONS.len(), 5);
    }

    #[test]
    fn borrowed_book_cannot_skip_lost() {
        let mut book = book_in(BookState::Available);
        book.make_borrowed().unwrap();
        assert_eq!(book.state(), &BookState::Borrowed);

        let error = book.make_available().unwrap_err();
        assert_eq!(
            error.current_context(),
            &KernelError::InvalidTransition {
                from: BookState::Borrowed,
                to: BookState::Available,
            }
        );
        assert_eq!(book.state(), &BookState::Borrowed);

        book.make_lost().unwrap();
        book.make_available().unwrap();
        assert_eq!(book.state(), &BookState::Available);
    }

    #[test]
    fn batch_stops_at_first_rejection() {
        let mut books = vec![
            book_in(BookState::Draft),
            book_in(BookState::Available),
            book_in(BookState::Draft),
        ];
        let error = books.change_state(BookState::Available).unwrap_err();
        assert_eq!(
            error.current_context(),
            &KernelError::InvalidTransition {
                from: BookState::Available,
                to: BookState::Available,
            }
        );
        let states: Vec<BookState> = books.iter().map(|book| *book.state()).collect();
        assert_eq!(
            states,
            vec![BookState::Available, BookState::Available, BookState::Draft]
        );
    }

    #[test]
    fn batch_applies_to_every_book_when_allowed() {
        let mut books = [book_in(BookState::Available), book_in(BookState::Borrowed)];
        books.make_lost().unwrap();
        assert!(books.iter().all(|book| book.state() == &BookState::Lost));
    }
}
