use kernel::KernelError;

use crate::error::ConvertError;

pub mod clock;
pub mod database;
pub mod error;
pub mod logging;

pub(crate) fn env(key: &str) -> error_stack::Result<String, KernelError> {
    dotenvy::var(key).convert_error()
}

/// Like [`env`], but an unset variable yields `None` instead of an error.
pub(crate) fn env_opt(key: &str) -> error_stack::Result<Option<String>, KernelError> {
    match dotenvy::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
        Err(error) => Err(error).convert_error(),
    }
}
