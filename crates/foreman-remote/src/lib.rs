//! Remote service clients for Pocket Foreman.
//!
//! - [`NotionTaskStore`]: task database and photo journal ([`foreman_core::RecordStore`])
//! - [`CloudinaryStore`]: image hosting ([`foreman_core::AssetStore`])
//! - [`LocalMirrorStore`]: synced folder tree ([`foreman_core::AssetStore`])
//!
//! HTTP calls go through [`RetryPolicy`]: up to four attempts with capped
//! exponential backoff on timeouts, 429 and 5xx responses.

pub mod cloudinary;
pub mod error;
pub mod local;
pub mod notion;
pub mod retry;
pub mod schema;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use error::{RemoteError, Result};
pub use local::LocalMirrorStore;
pub use notion::{NotionClient, NotionTaskStore};
pub use retry::{RetryPolicy, HTTP_TIMEOUT, RETRY_MAX};
pub use schema::PropertyNames;
