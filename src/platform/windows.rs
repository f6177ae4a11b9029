use winapi::shared::minwindef::{BOOL, DWORD};
use winapi::shared::ntdef::{NTSTATUS, PVOID, ULONG, WCHAR};
use winapi::shared::windef::HWND;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::libloaderapi::{FreeLibrary, GetProcAddress, LoadLibraryA};
use cstr::cstr;
use winapi::um::winbase::{FORMAT_MESSAGE_ALLOCATE_BUFFER, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS, FormatMessageW, LocalFree};
use winapi::um::winnt::{LANG_NEUTRAL, LPWSTR, MAKELANGID, SUBLANG_NEUTRAL};
use crate::{OsVersion, WindowCompositionAttributeData, WindowHandle};

/// Type for a pointer to the `SetWindowCompositionAttribute` function, found in
/// `user32.dll`. This function is responsible for requesting special window
/// composition effects, such as background blur.
type __SetWindowCompositionAttribute =
	unsafe extern "system" fn(HWND, PVOID) -> BOOL;

/// Type for a pointer to the `RtlGetVersion` function, found in `ntdll.dll`.
/// Unlike `GetVersionEx`, it reports the real version of the system regardless
/// of what the application manifest declares compatibility with.
type __RtlGetVersion =
	unsafe extern "system" fn(*mut OperatingSystemVersionInfoWide) -> NTSTATUS;

lazy_static::lazy_static! {
	/// The version of Windows the program is running under, if available.
	static ref VERSION: Option<OsVersion> = unsafe { query_version() };

	/// The `SetWindowCompositionAttribute` entry point, resolved once.
	///
	/// `user32.dll` is never freed after this, since the pointer lives for the
	/// rest of the process.
	static ref SET_WINDOW_COMPOSITION_ATTRIBUTE:
		Result<__SetWindowCompositionAttribute, Error> = unsafe {

		let library = LoadLibraryA(cstr!("user32.dll").as_ptr());
		if library.is_null() {
			Err(Error::MissingFunctionality {
				name: "user32.dll",
				error: WinError(GetLastError())
			})
		} else {
			let address = GetProcAddress(
				library,
				cstr!("SetWindowCompositionAttribute").as_ptr());
			if address.is_null() {
				let error = WinError(GetLastError());
				FreeLibrary(library);
				Err(Error::MissingFunctionality {
					name: "user32.dll\\SetWindowCompositionAttribute",
					error
				})
			} else {
				Ok(std::mem::transmute::<_, __SetWindowCompositionAttribute>(address))
			}
		}
	};
}

/// The version of Windows the program is running under, if available.
pub fn os_version() -> Option<OsVersion> {
	*VERSION
}

/// Asks `ntdll.dll` for the version of the running system.
unsafe fn query_version() -> Option<OsVersion> {
	let byte_size = std::mem::size_of::<OperatingSystemVersionInfoWide>();
	let byte_size = match ULONG::try_from(byte_size) {
		Ok(byte_size) => byte_size,
		Err(_) => {
			log::error!(
				"The size of an OperatingSystemVersionInfoWide does not fit in \
				 a ULONG. This points towards a broken build environment.");
			return None
		}
	};

	let mut version = OperatingSystemVersionInfoWide {
		byte_size,
		major_version: 0,
		minor_version: 0,
		build_number: 0,
		platform_id: 0,
		service_pack: [0; 128]
	};

	let library = LoadLibraryA(cstr!("ntdll.dll").as_ptr());
	if library.is_null() {
		/* Ntdll.dll is not available in this environment. This may happen
		 * in sandboxed environments such as UWP. */
		log::warn!(
			"Ntdll.dll is not available. Blur will be treated as \
			 unsupported.");
		return None
	}

	let address = GetProcAddress(
		library,
		cstr!("RtlGetVersion").as_ptr());
	if address.is_null() {
		log::warn!(
			"RtlGetVersion is not available. Blur will be treated as \
			 unsupported.");
		FreeLibrary(library);
		return None
	}

	let result = {
		let function = std::mem
			::transmute
			::<_, __RtlGetVersion>(address);
		function(&mut version as *mut _)
	};
	FreeLibrary(library);

	if result != 0 {
		/* RtlGetVersion is documented to always return STATUS_SUCCESS. */
		log::error!(
			"RtlGetVersion returned {} when it should have been an \
			 infallible function. This may be indicative of a bug.",
			result);
		return None
	}

	Some(OsVersion {
		major: version.major_version,
		minor: version.minor_version,
		build: version.build_number
	})
}

/// Hands the request over to `SetWindowCompositionAttribute`.
///
/// The request must stay alive, along with the record it points to, for the
/// duration of the call. That's guaranteed by the caller holding it mutably
/// borrowed.
pub fn set_window_composition_attribute(
	window: WindowHandle,
	data: *mut WindowCompositionAttributeData) -> Result<(), Error> {

	let function = SET_WINDOW_COMPOSITION_ATTRIBUTE.clone()?;
	let result = unsafe {
		function(window.get() as HWND, data as PVOID)
	};
	if result == 0 {
		return Err(Error::FailedInvocation {
			call: "SetWindowCompositionAttribute",
			description: "set the composition attribute of the window",
			error: WinError(unsafe { GetLastError() })
		})
	}

	Ok(())
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
	/// This error is triggered if required functionality or one of its
	/// dependencies are not available in the system.
	#[error("Could not find \"{name}\": {error}")]
	MissingFunctionality {
		/// The name of the functionality that could not be found.
		name: &'static str,
		/// The error code given by `GetLastError()`.
		error: WinError
	},
	/// This error is triggered if required functionality and all of its
	/// dependencies are present, but in spite of that, the invocation of the
	/// functionality has failed.
	#[error("Could not {description}: call to \"{call}\" failed: {error}")]
	FailedInvocation {
		/// The name of the functionality whose invocation failed.
		call: &'static str,
		/// The description of what was trying to be achieved.
		description: &'static str,
		/// The error code given by `GetLastError()`.
		error: WinError
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WinError(DWORD);
impl WinError {
	/// Retrieve the message for this error code from Windows, if available.
	pub fn message(&self) -> Option<String> {
		let mut buffer: LPWSTR = std::ptr::null_mut();
		let size = unsafe {
			FormatMessageW(
				FORMAT_MESSAGE_ALLOCATE_BUFFER
					| FORMAT_MESSAGE_FROM_SYSTEM
					| FORMAT_MESSAGE_IGNORE_INSERTS,
				std::ptr::null_mut(),
				self.0,
				MAKELANGID(LANG_NEUTRAL, SUBLANG_NEUTRAL) as DWORD,
				&mut buffer as *mut LPWSTR as *mut _,
				0,
				std::ptr::null_mut())
		};
		if size == 0 {
			return None
		}

		let slice = unsafe {
			std::slice::from_raw_parts(buffer, size as usize)
		};
		let message = std::char::decode_utf16(slice.iter().cloned())
			.map(|c| c.unwrap_or('_'))
			.collect::<String>()
			.trim()
			.to_string();

		/* Free the buffer FormatMessageW allocated for us. */
		unsafe {
			LocalFree(buffer as *mut _);
		}

		Some(message)
	}
}
impl std::fmt::Display for WinError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self.message() {
			Some(message) =>
				write!(f, "{} (0x{:08x})", message, self.0),
			None =>
				write!(f, "0x{:08x}", self.0),
		}
	}
}
impl std::error::Error for WinError {}

/// The operating system version information.
///
/// Same layout as `RTL_OSVERSIONINFOW`.
#[repr(C)]
#[allow(dead_code)]
struct OperatingSystemVersionInfoWide {
	/// The size of this structure. Must be set before the call, or Windows
	/// will not recognize the structure.
	byte_size: ULONG,
	major_version: ULONG,
	minor_version: ULONG,
	build_number: ULONG,
	platform_id: ULONG,
	/// The service-pack version string. Left untouched by Windows when no
	/// service pack is installed.
	service_pack: [WCHAR; 128],
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_is_available_on_windows() {
		let version = os_version().expect("RtlGetVersion should be present");
		assert!(version.major >= 6);
	}

	#[test]
	fn composition_entry_point_resolves() {
		assert!(SET_WINDOW_COMPOSITION_ATTRIBUTE.is_ok());
	}
}
