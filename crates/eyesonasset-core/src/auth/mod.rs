//! Authentication module for managing the local session lifecycle.
//!
//! This module provides:
//! - `KeyValueStorage`: the persistent string slot the session lives in
//! - `SessionStore`: save/read/clear of the token + expiry pair
//! - `SessionEvaluator`: lazy expiry check that clears stale records
//! - `AuthGateway`: the network login and registration calls
//! - `LogoutAction`: clear the session and return to the login surface
//!
//! Expiry is only checked when somebody asks; there is no background timer.
//! The backend's own 401 stays the final authority.

pub mod clock;
pub mod credentials;
pub mod evaluator;
pub mod gateway;
pub mod logout;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::Credentials;
pub use evaluator::SessionEvaluator;
pub use gateway::{AuthGateway, LoginEncoding, LoginError, LoginResponse, RegisteredUser};
pub use logout::LogoutAction;
pub use session::{LocalSessionStore, SessionRecord, SessionStore};
pub use storage::{FileStorage, KeyValueStorage, KeyringStorage, MemoryStorage};
