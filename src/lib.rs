/// Platform-specific code for talking to the window compositor.
mod platform;

/// Detection of whether the host supports blur at all.
mod capability;
pub use capability::*;

/// Fixed-layout records passed to the compositor.
mod composition;
pub use composition::*;

/// Elements whose native window may or may not exist yet.
mod element;
pub use element::*;

/// Public interface for toggling the blur of window backgrounds.
mod blur;
pub use blur::*;

/// Errors types that may be triggered from blurbehind functions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// This error indicates that the given window type in the current system
	/// does not support blur through this crate.
	#[error("feature is not supported for this window")]
	NotSupported,
	/// This error indicates that, while blur may be supported for the given
	/// window in the current system, it could not be applied in the current
	/// environment.
	#[error("feature is not available for this window: {0}")]
	NotAvailable(String),
}
