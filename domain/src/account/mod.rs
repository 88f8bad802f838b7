//! Account domain: registered users.

pub mod entities;

pub use entities::{User, UserView};
