use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum TypesError {
    #[error("address '{0}' is not a well-formed 0x-prefixed 20-byte hex string")]
    BadAddress(String),

    #[error("amount '{0}' is not a positive fixed-point value with 18 fractional digits")]
    BadAmount(String),
}
