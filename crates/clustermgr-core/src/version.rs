// API version gate.
//
// The version is fixed in the transport's base URL; operations introduced
// in later API releases check it before touching the network.

use clustermgr_api::{Error, HttpClient};

/// Fail with `VersionMismatch` when `client` speaks an API older than `min`.
pub fn require(client: &HttpClient, min: u32, operation: &str) -> Result<(), Error> {
    check(client.version(), min, operation)
}

pub(crate) fn check(actual: u32, min: u32, operation: &str) -> Result<(), Error> {
    if actual < min {
        return Err(Error::VersionMismatch {
            operation: operation.to_owned(),
            required: min,
            actual,
        });
    }
    Ok(())
}
