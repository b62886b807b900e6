//! REST client module
//!
//! Talks to the storefront backend:
//! - `GET /api/products` for the listing
//! - `POST /api/generate` with `{ selectedResources: [id] }`
//! - `POST /api/update` with `{ description, productId }`

pub mod envelope;
pub mod error;
pub mod rest;

pub use error::ClientError;
pub use rest::RestClient;
