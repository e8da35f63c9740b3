use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Internal plain-text notes.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookNotes(String);

impl BookNotes {
    pub fn new(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }
}

/// HTML description, kept verbatim. Rendering and sanitizing belong to the
/// presentation layer.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookDescription(String);

impl BookDescription {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }
}

/// Cover image bytes.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookCover(Vec<u8>);

impl BookCover {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct OutOfPrint(bool);

impl OutOfPrint {
    pub fn new(out_of_print: impl Into<bool>) -> Self {
        Self(out_of_print.into())
    }
}
