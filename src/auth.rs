//! Auth-domain models: scope sets, redacted secrets, and the provider token bundle.

pub mod authorization;
pub mod scope;
pub mod secret;

pub use authorization::*;
pub use scope::*;
pub use secret::*;
