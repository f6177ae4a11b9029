use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use crate::{
	supports_blur,
	AccentPolicy,
	Compositor,
	Element,
	ElementKind,
	User32Compositor,
	WindowCompositionAttributeData,
};

/// The attached setting controlling whether the window owning an element has
/// its background blurred.
///
/// Setting this on **any** framework element blurs the entire native window
/// hosting it, since elements don't generally have windows of their own. For
/// a popup, set it on the root child of the popup rather than on whatever
/// element owns the popup.
///
/// For the blur to be visible, the window must be drawn with a transparent or
/// semitransparent background.
pub struct BlurWindow<C: Compositor + 'static = User32Compositor> {
	compositor: Rc<C>,
	supported: bool,
	/// Elements with an application of this setting waiting for realization.
	pending: Rc<RefCell<HashSet<usize>>>,
}

impl BlurWindow {
	/// The setting backed by the system compositor, enabled only if the
	/// running system supports blur.
	pub fn new() -> Self {
		Self::with_compositor(User32Compositor, supports_blur())
	}
}

impl Default for BlurWindow {
	fn default() -> Self {
		Self::new()
	}
}

impl<C: Compositor + 'static> BlurWindow<C> {
	/// The setting backed by the given compositor. When `supported` is false,
	/// changes are recorded but never reach the compositor.
	pub fn with_compositor(compositor: C, supported: bool) -> Self {
		Self {
			compositor: Rc::new(compositor),
			supported,
			pending: Default::default()
		}
	}

	pub fn compositor(&self) -> &C {
		&self.compositor
	}

	pub fn is_supported(&self) -> bool {
		self.supported
	}

	/// The current value of the setting for the element. Defaults to `false`.
	pub fn get(&self, element: &Element) -> bool {
		element.blur_window()
	}

	/// Assigns the setting for the element.
	///
	/// Every assignment counts as a change, even if the value is the same as
	/// before, and results in its own request to the compositor.
	pub fn set(&self, element: &Element, value: bool) {
		element.set_blur_window(value);
		self.on_changed(element, value);
	}

	fn on_changed(&self, element: &Element, value: bool) {
		if !self.supported {
			return
		}
		if element.kind() != ElementKind::Framework {
			return
		}

		if element.is_realized() {
			apply_blur(&*self.compositor, element, value);
			return
		}

		/* The window doesn't exist yet. Only one application waits for it, and
		 * it picks up whatever the setting holds by the time it runs. */
		if !self.pending.borrow_mut().insert(element.id()) {
			return
		}
		log::trace!("Deferring blur until the element is realized");

		let compositor = self.compositor.clone();
		let pending = PendingBlur {
			element: element.id(),
			pending: Rc::downgrade(&self.pending)
		};
		element.on_realized(move |element| {
			drop(pending);
			apply_blur(&*compositor, element, element.blur_window());
		});
	}
}

/// Marks an element as waiting for a deferred application.
///
/// The mark goes away when the deferred callback runs or is dropped along
/// with an element that never got realized.
struct PendingBlur {
	element: usize,
	pending: Weak<RefCell<HashSet<usize>>>,
}
impl Drop for PendingBlur {
	fn drop(&mut self) {
		if let Some(pending) = self.pending.upgrade() {
			pending.borrow_mut().remove(&self.element);
		}
	}
}

/// Turns blur on or off for the native window owning the element.
///
/// Nothing happens if the element has no window, as is the case when the
/// window has already been closed. The effect is cosmetic, so a failure of
/// the compositor is logged and otherwise ignored.
pub fn apply_blur<C>(compositor: &C, element: &Element, enabled: bool)
	where C: Compositor + ?Sized {

	let window = match element.window_handle() {
		Some(window) => window,
		None => {
			log::debug!("Element has no window, not applying blur");
			return
		}
	};

	let mut policy = AccentPolicy::for_blur(enabled);
	let mut data = WindowCompositionAttributeData::accent_policy(&mut policy);

	let state = if enabled { "enabled" } else { "disabled" };
	match compositor.set_window_composition_attribute(window, &mut data) {
		Ok(()) => log::debug!("Blur {} on window {}", state, window),
		Err(what) => log::warn!(
			"Blur could not be {} on window {}: {}",
			state,
			window,
			what),
	}
}
