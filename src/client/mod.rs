//! Client-side session handling and a typed HTTP client for the account API.

pub mod api;
pub mod cancel;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiError, ClientConfig, SignupForm};
pub use cancel::CancelToken;
pub use session::{Access, Session};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
