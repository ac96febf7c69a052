#![deny(missing_docs)]

//! # Ramp Models
//!
//! Core data types for the onramp session-token service.
//!
//! ## Issuance flow
//!
//! ```text
//! SessionTokenRequest
//! ├── DestinationWallet (address + blockchains + assets)
//! └── widget defaults (fiat currency, amount, network, experience)
//!         │
//!         ▼  credential load → assertion signing → upstream POST
//! SessionToken ──► SessionTokenResponse (real or development fallback)
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`credentials`] | CDP API credentials and key-material classification |
//! | [`wallet`] | Destination wallet specification |
//! | [`session`] | Session-token request/response DTOs and the token itself |
//! | [`error`] | Validation errors for model construction |

pub mod credentials;
pub mod error;
pub mod session;
pub mod wallet;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `ramp_models::Credentials` directly.
pub use credentials::*;
pub use error::*;
pub use session::*;
pub use wallet::*;
