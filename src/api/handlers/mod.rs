// HTTP handlers grouped by resource

pub mod auth;
pub mod players;
pub mod teams;
pub mod users;
pub mod ws;
