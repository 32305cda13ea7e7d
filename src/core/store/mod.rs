//! Secret store adapters.
//!
//! A store turns a [`SecretKey`] into a value. Implementations make exactly
//! one attempt per call; caching and retry policy live above this layer.
//!
//! ## Adding a New Store
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `bitwarden.rs`)
//! 3. Add a variant to `StoreKind` and wire it up in `backend.rs`

use crate::core::secret::{SecretKey, SecretValue};
use crate::error::StoreError;

mod backend;
mod env;
mod onepassword;
mod process;

pub use backend::{build, StoreKind};
pub use env::EnvStore;
pub use onepassword::OnePassword;

/// Secret store trait.
///
/// `fetch` returns `Ok(None)` when the store answered but holds no such
/// secret. Errors split into fatal ones (see [`StoreError::is_fatal`]) that
/// make the whole store unusable and per-key ones such as timeouts.
pub trait SecretStore {
    /// Backend name for display and logs.
    fn name(&self) -> &'static str;

    /// Check that the store can answer lookups at all.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` when the user must sign in first,
    /// or `StoreError::Unavailable` when the backend cannot be reached.
    fn ensure_ready(&self) -> Result<(), StoreError>;

    /// Fetch a single secret.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the lookup could not be answered.
    fn fetch(&self, key: &SecretKey) -> Result<Option<SecretValue>, StoreError>;
}

impl<S: SecretStore + ?Sized> SecretStore for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn ensure_ready(&self) -> Result<(), StoreError> {
        (**self).ensure_ready()
    }

    fn fetch(&self, key: &SecretKey) -> Result<Option<SecretValue>, StoreError> {
        (**self).fetch(key)
    }
}
