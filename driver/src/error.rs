use std::num::ParseIntError;

use error_stack::Report;
use kernel::KernelError;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    SqlX(sqlx::Error),
    #[error(transparent)]
    Env(dotenvy::Error),
    #[error(transparent)]
    Conversion(anyhow::Error),
}

impl From<sqlx::Error> for DriverError {
    fn from(value: sqlx::Error) -> Self {
        Self::SqlX(value)
    }
}

impl From<dotenvy::Error> for DriverError {
    fn from(value: dotenvy::Error) -> Self {
        Self::Env(value)
    }
}

impl From<ParseIntError> for DriverError {
    fn from(value: ParseIntError) -> Self {
        Self::Conversion(anyhow::Error::new(value))
    }
}

impl From<time::error::ComponentRange> for DriverError {
    fn from(value: time::error::ComponentRange) -> Self {
        Self::Conversion(anyhow::Error::new(value))
    }
}

/// Maps driver-level failures onto the kernel's error vocabulary.
pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}

impl<T> ConvertError for Result<T, DriverError> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| Report::from(error).change_context(KernelError::Internal))
    }
}

impl<T> ConvertError for Result<T, dotenvy::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(DriverError::from).convert_error()
    }
}
