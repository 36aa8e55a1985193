//! Authentication Module
//!
//! Bearer-token authentication for the relay server. Tokens are HS256 JWTs
//! whose `sub` claim is the user id; the relay never stores credentials.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs      - Module exports
//! ├── sessions.rs - JWT creation and verification
//! └── bearer.rs   - `Authorization: Bearer` extractor
//! ```

/// JWT token generation and validation
pub mod sessions;

/// Bearer token extractor
pub mod bearer;

pub use bearer::AuthUser;
pub use sessions::{create_token, verify_token, Claims};
