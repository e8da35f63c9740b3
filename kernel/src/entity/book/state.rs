use std::fmt::Display;
use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

/// Availability of a book. Transitions between states are governed by
/// the availability workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookState {
    #[default]
    Draft,
    Available,
    Borrowed,
    Lost,
}

impl BookState {
    pub const ALL: [BookState; 4] = [
        BookState::Draft,
        BookState::Available,
        BookState::Borrowed,
        BookState::Lost,
    ];

    /// Storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookState::Draft => "draft",
            BookState::Available => "available",
            BookState::Borrowed => "borrowed",
            BookState::Lost => "lost",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            BookState::Draft => "Not Available",
            BookState::Available => "Available",
            BookState::Borrowed => "Borrowed",
            BookState::Lost => "Lost",
        }
    }
}

impl Display for BookState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookState {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                Report::new(KernelError::Validation)
                    .attach_printable(format!("unknown book state `{s}`"))
            })
    }
}

#[cfg(test)]
mod test {
    use super::BookState;

    #[test]
    fn default_is_draft() {
        assert_eq!(BookState::default(), BookState::Draft);
    }

    #[test]
    fn parses_storage_keys() {
        for state in BookState::ALL {
            assert_eq!(state.as_str().parse::<BookState>().unwrap(), state);
        }
        assert!("returned".parse::<BookState>().is_err());
    }
}
