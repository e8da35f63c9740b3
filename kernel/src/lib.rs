pub use crate::error::*;

mod clock;
mod database;
mod entity;
mod error;
mod modify;
mod query;
mod search;
mod workflow;

#[cfg(feature = "prelude")]
pub mod prelude {
    pub mod entity {
        pub use crate::entity::*;
    }
    pub mod workflow {
        pub use crate::workflow::*;
    }
}

#[cfg(feature = "interface")]
pub mod interface {
    pub mod clock {
        pub use crate::clock::*;
    }
    pub mod database {
        pub use crate::database::*;
    }
    pub mod query {
        pub use crate::query::*;
    }
    pub mod search {
        pub use crate::search::*;
    }
    pub mod update {
        pub use crate::modify::*;
    }
}
