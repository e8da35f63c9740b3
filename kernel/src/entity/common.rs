mod archive;
mod reference;

pub use self::{archive::*, reference::*};
