mod v4_signer;

pub use v4_signer::{V4Signer, DEFAULT_EXPIRATION, MAX_EXPIRATION};
