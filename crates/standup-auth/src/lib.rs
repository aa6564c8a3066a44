//! Bearer credentials for the status reporting API
//!
//! Tokens are HS256 JWTs whose subject is the actor's user id and whose
//! `role` claim carries the actor's role.

pub mod jwt;

pub use jwt::{JwtClaims, JwtError, JwtValidator};

/// Issuer written into tokens minted by this service
pub const ISSUER: &str = "standup";

/// Audience written into tokens minted by this service
pub const AUDIENCE: &str = "standup-api";
