//! Credential storage contract and the built-in in-memory slot.

pub mod memory;

pub use memory::MemoryCredentialStore;

// self
use crate::auth::Credential;

/// Process-wide credential slot read by every outbound request.
///
/// Implementations must make `get`, `set`, and `clear` atomic with respect to each other so a
/// reader never observes a half-written credential. The store performs no network calls or
/// navigation; callers react to a cleared slot on their own.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns a snapshot of the current credential, if any.
	fn get(&self) -> Option<Credential>;

	/// Replaces the current credential.
	fn set(&self, credential: Credential);

	/// Removes the current credential.
	fn clear(&self);
}
