//! [`TokenStore`] built from a pair of host-supplied functions.

// self
use crate::{
	_prelude::*,
	auth::RawAuthorization,
	store::{StoreError, StoreFuture, TokenStore},
};

type LoadFn = dyn Fn() -> Result<Option<RawAuthorization>, StoreError> + Send + Sync;
type SaveFn = dyn Fn(&RawAuthorization) -> Result<(), StoreError> + Send + Sync;

/// Adapter for hosts that already keep tokens somewhere (a settings table, a secrets
/// manager, a file) and only want to hand over a load function and a save function.
///
/// ```
/// use yt_partner::store::FnStore;
///
/// let store = FnStore::new(
/// 	|| Ok(None),
/// 	|authorization| {
/// 		println!("persist {} bytes", authorization.to_json_string().len());
///
/// 		Ok(())
/// 	},
/// );
/// # let _ = store;
/// ```
#[derive(Clone)]
pub struct FnStore {
	load: Arc<LoadFn>,
	save: Arc<SaveFn>,
}
impl FnStore {
	/// Wraps the provided load and save functions.
	pub fn new<L, S>(load: L, save: S) -> Self
	where
		L: 'static + Fn() -> Result<Option<RawAuthorization>, StoreError> + Send + Sync,
		S: 'static + Fn(&RawAuthorization) -> Result<(), StoreError> + Send + Sync,
	{
		Self { load: Arc::new(load), save: Arc::new(save) }
	}
}
impl TokenStore for FnStore {
	fn load(&self) -> StoreFuture<'_, Option<RawAuthorization>> {
		let result = (self.load)();

		Box::pin(async move { result })
	}

	fn save(&self, authorization: RawAuthorization) -> StoreFuture<'_, ()> {
		let result = (self.save)(&authorization);

		Box::pin(async move { result })
	}
}
impl Debug for FnStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnStore(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn forwards_to_host_functions() {
		let saved = Arc::new(Mutex::new(Vec::<String>::new()));
		let sink = saved.clone();
		let store = FnStore::new(
			|| {
				RawAuthorization::from_json_str("{\"access_token\":\"stored\"}")
					.map(Some)
					.map_err(|e| StoreError::Serialization { message: e.to_string() })
			},
			move |authorization| {
				sink.lock().push(authorization.to_json_string());

				Ok(())
			},
		);
		let loaded = store
			.load()
			.await
			.expect("Load function should succeed.")
			.expect("Load function should yield the stored bundle.");

		assert_eq!(loaded.access_token(), Some("stored"));

		store.save(loaded).await.expect("Save function should succeed.");

		assert_eq!(saved.lock().as_slice(), ["{\"access_token\":\"stored\"}"]);
	}

	#[tokio::test]
	async fn load_failures_propagate() {
		let store = FnStore::new(
			|| Err(StoreError::Backend { message: "vault sealed".into() }),
			|_| Ok(()),
		);
		let err = store.load().await.expect_err("Load failures should surface.");

		assert_eq!(err, StoreError::Backend { message: "vault sealed".into() });
	}
}
