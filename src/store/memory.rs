//! Thread-safe in-memory [`TokenStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::RawAuthorization,
	store::{StoreError, StoreFuture, TokenStore},
};

#[derive(Debug, Default)]
struct MemoryState {
	current: Option<RawAuthorization>,
	saves: Vec<RawAuthorization>,
}

/// In-process store that keeps the current bundle plus every bundle ever saved.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<MemoryState>>);
impl MemoryStore {
	/// Creates a store pre-seeded with `authorization`, as if a prior run persisted it.
	pub fn seeded(authorization: RawAuthorization) -> Self {
		Self(Arc::new(RwLock::new(MemoryState { current: Some(authorization), saves: Vec::new() })))
	}

	/// Returns the currently persisted bundle.
	pub fn current(&self) -> Option<RawAuthorization> {
		self.0.read().current.clone()
	}

	/// Number of times [`TokenStore::save`] has been invoked.
	pub fn save_count(&self) -> usize {
		self.0.read().saves.len()
	}

	/// Every bundle passed to [`TokenStore::save`], oldest first.
	pub fn saved(&self) -> Vec<RawAuthorization> {
		self.0.read().saves.clone()
	}

	fn save_now(&self, authorization: RawAuthorization) -> Result<(), StoreError> {
		let mut state = self.0.write();

		state.saves.push(authorization.clone());
		state.current = Some(authorization);

		Ok(())
	}
}
impl TokenStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<RawAuthorization>> {
		let current = self.current();

		Box::pin(async move { Ok(current) })
	}

	fn save(&self, authorization: RawAuthorization) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.save_now(authorization) })
	}
}
