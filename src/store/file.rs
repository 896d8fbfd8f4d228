//! File-backed [`TokenStore`] that keeps the bundle as a JSON document on disk.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::RawAuthorization,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Persists the authorization bundle to a JSON file after each save.
///
/// Writes go to a sibling `.tmp` file that is synced and renamed over the target, so a
/// crash mid-write leaves the previous bundle intact.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	write_lock: Arc<Mutex<()>>,
}
impl FileStore {
	/// Opens a store at `path`, creating parent directories as needed.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path, write_lock: Default::default() })
	}

	/// Location of the JSON document.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_now(path: &Path) -> Result<Option<RawAuthorization>, StoreError> {
		if !path.exists() {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(None);
		}

		RawAuthorization::from_json_slice(&bytes).map(Some).map_err(|e| {
			StoreError::Serialization {
				message: format!("Failed to parse {} at `{}`: {}", path.display(), e.path(), e.inner()),
			}
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn write_now(&self, authorization: &RawAuthorization) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock();

		Self::ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(authorization).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to serialize authorization: {e}") }
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<RawAuthorization>> {
		Box::pin(async move { Self::read_now(&self.path) })
	}

	fn save(&self, authorization: RawAuthorization) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.write_now(&authorization) })
	}
}
