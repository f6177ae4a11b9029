use crate::OsVersion;

#[cfg(windows)]
pub mod windows;

/// The version of the operating system we're running under, if available.
pub fn os_version() -> Option<OsVersion> {
	#[cfg(windows)]
	return windows::os_version();

	#[cfg(not(any(
		windows
	)))]
	None
}
