// Credential plumbing: bcrypt hashing and HS256 tokens

pub mod jwt;
pub mod password;
