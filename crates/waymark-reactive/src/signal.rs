//! Signal - Observable Value Cell
//!
//! `Signal<T>` holds a value and an explicit list of subscribers. Writing a new
//! value notifies every subscriber registered at the moment of the write.
//!
//! ## Key Features
//!
//! - **Explicit Subscriptions**: `subscribe()` returns a [`SubscriptionId`] that is
//!   later handed back to `unsubscribe()`. There is no hidden runtime.
//! - **Re-entrancy**: Listeners run with no borrow held on the signal, so a
//!   listener may read, write, subscribe or unsubscribe while being notified.
//! - **Lightweight**: Clones share the same value and subscriber list.
//!
//! ## Example
//!
//! ```
//! use waymark_reactive::Signal;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let count = Signal::new(0);
//! let seen = Rc::new(Cell::new(0));
//!
//! let id = count.subscribe({
//! 	let seen = Rc::clone(&seen);
//! 	move |value: &i32| seen.set(*value)
//! });
//!
//! count.set(42);
//! assert_eq!(seen.get(), 42);
//!
//! count.unsubscribe(id);
//! count.set(7);
//! assert_eq!(seen.get(), 42);
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;

extern crate alloc;
use alloc::rc::Rc;
use alloc::vec::Vec;

/// Handle identifying one subscription on a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
	value: RefCell<T>,
	listeners: RefCell<Vec<(SubscriptionId, Listener<T>)>>,
	next_id: Cell<u64>,
	// Bumped on every write.
	generation: Cell<u64>,
}

/// A reactive cell that holds a value and notifies subscribers on change.
///
/// ## Cloning
///
/// `Signal<T>` shares its state via `Rc`. All clones observe the same value and
/// the same subscriber list.
pub struct Signal<T: 'static> {
	inner: Rc<Inner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: 'static> Signal<T> {
	/// Create a new Signal with the given initial value
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(Inner {
				value: RefCell::new(value),
				listeners: RefCell::new(Vec::new()),
				next_id: Cell::new(0),
				generation: Cell::new(0),
			}),
		}
	}

	/// Get a clone of the current value
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.inner.value.borrow().clone()
	}

	/// Borrow the current value for the duration of `f`
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.value.borrow())
	}

	/// Set the signal to a new value and notify subscribers
	///
	/// If a subscriber writes again while being notified, the nested write is
	/// delivered to every subscriber and the rest of the outer round is
	/// skipped, so the last value each subscriber sees is the current one.
	pub fn set(&self, value: T)
	where
		T: Clone,
	{
		*self.inner.value.borrow_mut() = value.clone();
		self.notify(&value);
	}

	/// Update the value in place, then notify subscribers once
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&mut T),
		T: Clone,
	{
		let value = {
			let mut slot = self.inner.value.borrow_mut();
			f(&mut slot);
			slot.clone()
		};
		self.notify(&value);
	}

	/// Register a listener invoked on every subsequent write
	///
	/// The listener is not called with the current value.
	pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
	where
		F: Fn(&T) + 'static,
	{
		let id = SubscriptionId(self.inner.next_id.get());
		self.inner.next_id.set(id.0 + 1);
		self.inner
			.listeners
			.borrow_mut()
			.push((id, Rc::new(listener)));
		id
	}

	/// Remove a listener. Returns `false` if the id was not registered.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut listeners = self.inner.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|(existing, _)| *existing != id);
		listeners.len() != before
	}

	/// Number of listeners currently registered
	pub fn subscriber_count(&self) -> usize {
		self.inner.listeners.borrow().len()
	}

	fn notify(&self, value: &T) {
		let generation = self.inner.generation.get() + 1;
		self.inner.generation.set(generation);

		// Snapshot so listeners can mutate the list while we iterate.
		let listeners: Vec<Listener<T>> = self
			.inner
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();

		tracing::trace!(listeners = listeners.len(), "signal notify");

		for listener in listeners {
			if self.inner.generation.get() != generation {
				tracing::trace!("signal notify superseded by a nested write");
				break;
			}
			listener(value);
		}
	}
}

impl<T: Default + 'static> Default for Signal<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("value", &*self.inner.value.borrow())
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}
