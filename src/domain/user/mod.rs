// User domain module
// Accounts, roles and credential rules

#![allow(clippy::module_inception)]

pub mod user;
pub mod value_objects;

pub use user::{NewUser, User};
pub use value_objects::{validate_password, Role, Username};
