use crate::platform;

/// First major version of Windows whose compositor honors the blur-behind
/// accent policy on arbitrary top-level windows.
const WINDOWS_10: u32 = 10;

lazy_static::lazy_static! {
	/// Whether the running system supports blur. Computed once, on first use.
	static ref SUPPORTED: bool = {
		let version = platform::os_version();
		let supported = supports_blur_on(version);
		log::debug!(
			"Blur support for operating system version {:?}: {}",
			version,
			supported);
		supported
	};
}

/// The version of the operating system the program is running under.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OsVersion {
	/// The major version number.
	pub major: u32,
	/// The minor version number.
	pub minor: u32,
	/// The build number.
	pub build: u32,
}

/// Whether blur can be applied on a system with the given version.
///
/// An unknown version never supports blur. We can't assume anything about it,
/// so it's better to leave the window alone than to poke at it with an
/// undocumented call.
pub fn supports_blur_on(version: Option<OsVersion>) -> bool {
	match version {
		Some(OsVersion { major, .. }) => major >= WINDOWS_10,
		None => false,
	}
}

/// Whether the running system supports blur.
///
/// The operating system is queried at most once per process. The answer can
/// never change while the process is alive, so it is never invalidated.
pub fn supports_blur() -> bool {
	*SUPPORTED
}

#[cfg(test)]
mod tests {
	use super::*;

	fn version(major: u32, minor: u32, build: u32) -> Option<OsVersion> {
		Some(OsVersion { major, minor, build })
	}

	#[test]
	fn older_systems_are_not_supported() {
		assert!(!supports_blur_on(version(5, 1, 2600)));
		assert!(!supports_blur_on(version(6, 1, 7601)));
		assert!(!supports_blur_on(version(6, 3, 9600)));
	}

	#[test]
	fn windows_10_and_later_are_supported() {
		assert!(supports_blur_on(version(10, 0, 10240)));
		assert!(supports_blur_on(version(10, 0, 22621)));
		assert!(supports_blur_on(version(11, 0, 0)));
	}

	#[test]
	fn unknown_version_is_not_supported() {
		assert!(!supports_blur_on(None));
	}

	#[test]
	fn cached_answer_is_stable() {
		assert_eq!(supports_blur(), supports_blur());
	}

	#[cfg(not(windows))]
	#[test]
	fn non_windows_hosts_are_not_supported() {
		assert!(!supports_blur());
	}
}
