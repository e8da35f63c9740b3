mod book;
mod member;
mod partner;

pub use self::{book::*, member::*, partner::*};
