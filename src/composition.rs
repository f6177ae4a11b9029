use std::ffi::c_void;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use raw_window_handle::{RawWindowHandle, Win32Handle};
use crate::Error;

/// A native top-level window handle.
///
/// This is an opaque, non-null `HWND`. Holding one says nothing about whether
/// the window it names is still alive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WindowHandle(NonZeroUsize);
impl WindowHandle {
	/// Wraps a raw handle value, returning `None` for the null handle.
	pub fn new(raw: usize) -> Option<Self> {
		NonZeroUsize::new(raw).map(Self)
	}

	/// The raw handle value.
	pub fn get(self) -> usize {
		self.0.get()
	}
}
impl TryFrom<RawWindowHandle> for WindowHandle {
	type Error = Error;
	fn try_from(handle: RawWindowHandle) -> Result<Self, Error> {
		match handle {
			RawWindowHandle::Win32(Win32Handle { hwnd, .. }) =>
				Self::new(hwnd as usize).ok_or(Error::NotSupported),
			/* UWP windows need Windows.UI.Composition rather than the accent
			 * policy, and no other handle type has a compositor we can talk
			 * to. */
			_ => Err(Error::NotSupported)
		}
	}
}
impl std::fmt::Display for WindowHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "0x{:08x}", self.0.get())
	}
}

/// The states the accent policy may assume.
#[repr(i32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AccentState {
	/// Disable accenting of the window.
	///
	/// This will instruct the compositor to leave the window as-is when drawing
	/// it on to the desktop. All other fields of the [accent policy] must be
	/// set to zero when this state is used.
	///
	/// [accent policy]: AccentPolicy
	Disabled = 0,
	/// Draw a color gradient on the background layer of the window.
	EnableGradient = 1,
	/// Draw a semitransparent color gradient on the background layer of the
	/// window.
	EnableTransparentGradient = 2,
	/// Blur what's behind the window.
	///
	/// All other fields of the [accent policy] must be set to zero when this
	/// state is used. The window itself has to be drawn with a transparent or
	/// semitransparent background for the blur to be visible.
	///
	/// [accent policy]: AccentPolicy
	EnableBlurBehind = 3,
	/// Blur what's behind the window with the acrylic material.
	EnableAcrylicBlurBehind = 4,
	/// Marks the end of the known states.
	InvalidState = 5,
}

/// The data for the accent policy attribute.
///
/// This structure has the same layout and size as the undocumented
/// `ACCENT_POLICY` structure. It crosses the FFI boundary by reference, so
/// field order and sizes must never change.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AccentPolicy {
	/// The state of the accent policy.
	pub accent_state: AccentState,
	/// Extra flags, whose meaning is determined by the state.
	pub accent_flags: i32,
	/// The tint of gradient and acrylic states, as `AABBGGRR`.
	pub gradient_color: u32,
	/// The identification number of the transition animation.
	pub animation_id: i32,
}
impl AccentPolicy {
	/// The policy turning blur on or off, with every other field zeroed.
	pub fn for_blur(enabled: bool) -> Self {
		Self {
			accent_state: if enabled {
				AccentState::EnableBlurBehind
			} else {
				AccentState::Disabled
			},
			accent_flags: 0,
			gradient_color: 0,
			animation_id: 0
		}
	}
}

/// The window composition attributes.
///
/// Only the attributes this crate knows how to fill are listed.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum WindowCompositionAttribute {
	/// The accent policy of the window.
	///
	/// This attribute tells the compositor, somewhat counter-intuitively, the
	/// way the background layer of the window should be treated.
	AccentPolicy = 19
}

/// The structure informing the composition attributes of the window.
///
/// This structure has the same layout and size as the undocumented
/// `WINCOMPATTRDATA` structure, passed on to `SetWindowCompositionAttribute`.
/// It borrows the attribute data it points to, so the record always outlives
/// the request referring to it.
#[repr(C)]
#[derive(Debug)]
pub struct WindowCompositionAttributeData<'a> {
	/// The number of the attribute which is intended to be changed.
	attribute: WindowCompositionAttribute,
	/// A pointer to the structure containing the data for the attribute.
	data: *mut c_void,
	/// The size, in bytes, of the attribute data structure.
	size_of_data: u32,
	_data: PhantomData<&'a mut AccentPolicy>,
}
impl<'a> WindowCompositionAttributeData<'a> {
	/// Builds a request setting the accent policy to the given record.
	pub fn accent_policy(policy: &'a mut AccentPolicy) -> Self {
		Self {
			attribute: WindowCompositionAttribute::AccentPolicy,
			data: policy as *mut AccentPolicy as *mut c_void,
			size_of_data: std::mem::size_of::<AccentPolicy>() as u32,
			_data: PhantomData
		}
	}

	/// The attribute this request changes.
	pub fn attribute(&self) -> WindowCompositionAttribute {
		self.attribute
	}

	/// The size, in bytes, declared for the attribute data.
	pub fn size_of_data(&self) -> u32 {
		self.size_of_data
	}

	/// Reads back the accent policy this request points to.
	pub fn policy(&self) -> Option<AccentPolicy> {
		if self.attribute != WindowCompositionAttribute::AccentPolicy
			|| self.size_of_data as usize != std::mem::size_of::<AccentPolicy>() {
			return None
		}

		/* The only way to build this structure is through `accent_policy`,
		 * which borrows the record for as long as the request lives. */
		Some(unsafe { *(self.data as *const AccentPolicy) })
	}

	/// The raw pointer handed to the compositor.
	pub(crate) fn as_mut_ptr(&mut self) -> *mut Self {
		self as *mut Self
	}
}

/// Something that applies composition attributes to native windows.
///
/// The system implementation is [`User32Compositor`]. Other implementations
/// are useful to observe what would be sent to the compositor.
pub trait Compositor {
	/// Applies the given composition attribute to the window.
	fn set_window_composition_attribute(
		&self,
		window: WindowHandle,
		data: &mut WindowCompositionAttributeData) -> Result<(), Error>;
}

/// The compositor reached through `SetWindowCompositionAttribute` in
/// `user32.dll`.
#[derive(Debug, Default, Copy, Clone)]
pub struct User32Compositor;
impl Compositor for User32Compositor {
	fn set_window_composition_attribute(
		&self,
		window: WindowHandle,
		data: &mut WindowCompositionAttributeData) -> Result<(), Error> {

		#[cfg(windows)]
		return crate::platform::windows::set_window_composition_attribute(
			window,
			data.as_mut_ptr())
			.map_err(|what| Error::NotAvailable(format!("{}", what)));

		#[cfg(not(any(
			windows
		)))]
		{
			let _ = (window, data.as_mut_ptr());
			Err(Error::NotSupported)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accent_policy_matches_native_layout() {
		assert_eq!(std::mem::size_of::<AccentState>(), 4);
		assert_eq!(std::mem::size_of::<AccentPolicy>(), 16);
		assert_eq!(std::mem::align_of::<AccentPolicy>(), 4);
	}

	#[cfg(target_pointer_width = "64")]
	#[test]
	fn request_matches_native_layout() {
		assert_eq!(std::mem::size_of::<WindowCompositionAttributeData>(), 24);
	}

	#[test]
	fn blur_policy_only_sets_the_state() {
		let on = AccentPolicy::for_blur(true);
		assert_eq!(on.accent_state, AccentState::EnableBlurBehind);
		assert_eq!((on.accent_flags, on.gradient_color, on.animation_id), (0, 0, 0));

		let off = AccentPolicy::for_blur(false);
		assert_eq!(off.accent_state, AccentState::Disabled);
		assert_eq!((off.accent_flags, off.gradient_color, off.animation_id), (0, 0, 0));
	}

	#[test]
	fn request_refers_to_the_policy() {
		let mut policy = AccentPolicy::for_blur(true);
		let data = WindowCompositionAttributeData::accent_policy(&mut policy);

		assert_eq!(data.attribute(), WindowCompositionAttribute::AccentPolicy);
		assert_eq!(data.size_of_data(), 16);
		assert_eq!(data.policy(), Some(AccentPolicy::for_blur(true)));
	}

	#[test]
	fn null_handle_is_rejected() {
		assert_eq!(WindowHandle::new(0), None);
		assert_eq!(WindowHandle::new(0x1234).map(WindowHandle::get), Some(0x1234));
	}

	#[test]
	fn win32_raw_handle_converts() {
		let mut raw = Win32Handle::empty();
		raw.hwnd = 0xbeef as *mut c_void;

		let handle = WindowHandle::try_from(RawWindowHandle::Win32(raw)).unwrap();
		assert_eq!(handle.get(), 0xbeef);
		assert!(matches!(
			WindowHandle::try_from(RawWindowHandle::Win32(Win32Handle::empty())),
			Err(Error::NotSupported)));
	}

	#[test]
	fn foreign_raw_handles_are_not_supported() {
		let raw = RawWindowHandle::Xlib(raw_window_handle::XlibHandle::empty());
		assert!(matches!(WindowHandle::try_from(raw), Err(Error::NotSupported)));
	}

	#[cfg(not(windows))]
	#[test]
	fn system_compositor_is_unavailable_off_windows() {
		let mut policy = AccentPolicy::for_blur(true);
		let mut data = WindowCompositionAttributeData::accent_policy(&mut policy);
		let result = User32Compositor.set_window_composition_attribute(
			WindowHandle::new(1).unwrap(),
			&mut data);
		assert!(matches!(result, Err(Error::NotSupported)));
	}
}
