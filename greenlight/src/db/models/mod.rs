//! Database record structures matching table schemas.
//!
//! Each submodule pairs the row type read back from the store (`*DBResponse`) with the request
//! types used to write it.

pub mod movies;
pub mod tokens;
pub mod users;
