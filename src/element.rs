use std::cell::RefCell;
use std::rc::Rc;
use raw_window_handle::HasRawWindowHandle;
use crate::{Error, WindowHandle};

/// Callback run once, when an element's native window comes into existence.
type RealizedCallback = Box<dyn FnOnce(&Element)>;

/// What an element is able to reach in the window tree.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementKind {
	/// An element that lives in, or is, a top-level window or popup.
	Framework,
	/// Pure content, which never gets a native window of its own and can't
	/// find the one hosting it.
	Content,
}

/// A user interface element whose native window may not exist yet.
///
/// Elements start out unrealized. Once the host creates the native window, it
/// calls [`Element::realize`], which runs every callback queued with
/// [`Element::on_realized`] exactly once. All of this happens on the thread
/// owning the user interface, so the element is neither `Send` nor `Sync`.
///
/// Clones refer to the same element.
#[derive(Clone)]
pub struct Element {
	state: Rc<RefCell<ElementState>>,
}

struct ElementState {
	kind: ElementKind,
	realized: bool,
	window: Option<WindowHandle>,
	on_realized: Vec<RealizedCallback>,
	/// Value of the attached blur setting.
	blur_window: bool,
}

impl Element {
	pub fn new(kind: ElementKind) -> Self {
		Self {
			state: Rc::new(RefCell::new(ElementState {
				kind,
				realized: false,
				window: None,
				on_realized: Vec::new(),
				blur_window: false
			}))
		}
	}

	/// A new, unrealized [framework](ElementKind::Framework) element.
	pub fn framework() -> Self {
		Self::new(ElementKind::Framework)
	}

	/// A new [content](ElementKind::Content) element.
	pub fn content() -> Self {
		Self::new(ElementKind::Content)
	}

	pub fn kind(&self) -> ElementKind {
		self.state.borrow().kind
	}

	/// Whether the native window for this element has been created.
	pub fn is_realized(&self) -> bool {
		self.state.borrow().realized
	}

	/// The handle of the native window owning this element.
	///
	/// This is `None` before realization and after the window has been closed.
	pub fn window_handle(&self) -> Option<WindowHandle> {
		self.state.borrow().window
	}

	/// Queues a callback to be run once this element is realized.
	///
	/// Callbacks queued after realization never run, just like a handler
	/// attached to a load notification that has already fired.
	pub fn on_realized<F>(&self, callback: F)
		where F: FnOnce(&Element) + 'static {

		let mut state = self.state.borrow_mut();
		if !state.realized {
			state.on_realized.push(Box::new(callback));
		}
	}

	/// Marks the native window of this element as created.
	///
	/// Queued callbacks run in the order they were queued, and are dropped
	/// afterwards. Realizing an element more than once only updates its
	/// handle.
	pub fn realize(&self, window: WindowHandle) {
		let callbacks = {
			let mut state = self.state.borrow_mut();
			state.window = Some(window);
			if state.realized {
				return
			}
			state.realized = true;
			std::mem::take(&mut state.on_realized)
		};

		log::trace!(
			"Element realized in window {}, running {} callback(s)",
			window,
			callbacks.len());
		for callback in callbacks {
			callback(self);
		}
	}

	/// Realizes this element with the window owning the given handle.
	pub fn realize_from<H: HasRawWindowHandle>(&self, window: &H) -> Result<(), Error> {
		let handle = WindowHandle::try_from(window.raw_window_handle())?;
		self.realize(handle);
		Ok(())
	}

	/// Forgets the native window, as happens when it's closed.
	pub fn close(&self) {
		self.state.borrow_mut().window = None;
	}

	pub(crate) fn blur_window(&self) -> bool {
		self.state.borrow().blur_window
	}

	pub(crate) fn set_blur_window(&self, value: bool) {
		self.state.borrow_mut().blur_window = value;
	}

	/// Identity of the element, shared by all of its clones.
	pub(crate) fn id(&self) -> usize {
		Rc::as_ptr(&self.state) as usize
	}
}

impl std::fmt::Debug for Element {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("Element")
			.field("kind", &state.kind)
			.field("realized", &state.realized)
			.field("window", &state.window)
			.field("blur_window", &state.blur_window)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;

	fn handle(raw: usize) -> WindowHandle {
		WindowHandle::new(raw).unwrap()
	}

	#[test]
	fn new_elements_are_unrealized() {
		let element = Element::framework();
		assert!(!element.is_realized());
		assert_eq!(element.window_handle(), None);
		assert!(!element.blur_window());
	}

	#[test]
	fn callbacks_run_once_on_realization() {
		let element = Element::framework();
		let runs = Rc::new(Cell::new(0));

		let counter = runs.clone();
		element.on_realized(move |element| {
			assert_eq!(element.window_handle(), Some(handle(0x10)));
			counter.set(counter.get() + 1);
		});
		assert_eq!(runs.get(), 0);

		element.realize(handle(0x10));
		assert_eq!(runs.get(), 1);

		element.realize(handle(0x10));
		assert_eq!(runs.get(), 1);
	}

	#[test]
	fn callbacks_run_in_queue_order() {
		let element = Element::framework();
		let order = Rc::new(RefCell::new(Vec::new()));

		for i in 0..3 {
			let order = order.clone();
			element.on_realized(move |_| order.borrow_mut().push(i));
		}
		element.realize(handle(1));

		assert_eq!(*order.borrow(), vec![0, 1, 2]);
	}

	#[test]
	fn callbacks_may_queue_more_callbacks() {
		let element = Element::framework();
		let late = Rc::new(Cell::new(false));

		let flag = late.clone();
		element.on_realized(move |element| {
			element.on_realized(move |_| flag.set(true));
		});
		element.realize(handle(1));

		/* The notification has already fired, so the late callback is
		 * dropped. */
		assert!(!late.get());
	}

	#[test]
	fn closing_forgets_the_handle() {
		let element = Element::framework();
		element.realize(handle(0x20));
		element.close();

		assert!(element.is_realized());
		assert_eq!(element.window_handle(), None);
	}

	#[test]
	fn clones_share_state() {
		let element = Element::framework();
		let other = element.clone();
		other.realize(handle(0x30));

		assert!(element.is_realized());
		assert_eq!(element.window_handle(), Some(handle(0x30)));
	}

	#[test]
	fn clones_share_identity() {
		let element = Element::framework();
		assert_eq!(element.id(), element.clone().id());
		assert_ne!(element.id(), Element::framework().id());
	}
}
