mod book;
mod common;
mod member;
mod partner;

pub use self::{book::*, common::*, member::*, partner::*};
