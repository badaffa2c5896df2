//! Entity <-> model mappers

mod channel;
mod user;
