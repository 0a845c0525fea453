//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{_prelude::*, auth::Credential, store::CredentialStore};

/// Single-slot credential store shared by clones.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore(Arc<RwLock<Option<Credential>>>);
impl MemoryCredentialStore {
	/// Creates a store seeded with an existing credential (e.g., a restored session).
	pub fn with_credential(credential: Credential) -> Self {
		Self(Arc::new(RwLock::new(Some(credential))))
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn get(&self) -> Option<Credential> {
		self.0.read().clone()
	}

	fn set(&self, credential: Credential) {
		*self.0.write() = Some(credential);
	}

	fn clear(&self) {
		self.0.write().take();
	}
}
