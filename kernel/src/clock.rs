use time::Date;

/// Ambient source of "today". Every date rule (release date validation, age
/// computation, search translation) reads the current date through this.
pub trait Clock: 'static + Sync + Send {
    fn today(&self) -> Date;
}

pub trait DependOnClock: 'static + Sync + Send {
    type Clock: Clock;
    fn clock(&self) -> &Self::Clock;
}
