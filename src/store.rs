//! Token store adapter contract and the built-in adapters.
//!
//! The credential manager never decides where authorizations live. The host supplies a
//! [`TokenStore`] whose `load` yields the previously persisted bundle (if any) and whose
//! `save` is invoked after every exchange or refresh.

pub mod closure;
pub mod file;
pub mod memory;

pub use closure::FnStore;
pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::RawAuthorization};

/// Boxed future returned by [`TokenStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract implemented by host token stores.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Loads the previously persisted authorization, if any.
	fn load(&self) -> StoreFuture<'_, Option<RawAuthorization>>;

	/// Persists a newly obtained or refreshed authorization, replacing any earlier one.
	fn save(&self, authorization: RawAuthorization) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
