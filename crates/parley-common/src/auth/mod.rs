//! Session token validation

mod session;

pub use session::{SessionClaims, SessionTokens};
