//! Auth-domain identifiers, bearer tokens, and the credential model.

pub mod credential;
pub mod identity;
pub mod token;

pub use credential::*;
pub use identity::*;
pub use token::*;
