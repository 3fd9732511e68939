//! Integration tests for Signal
//!
//! Exercise the public API the way the router uses it: one cell, several
//! listeners, and listeners that write back or unsubscribe mid-notification.

use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;
use waymark_reactive::Signal;

#[rstest]
fn test_clones_share_value_and_listeners() {
	let signal = Signal::new(String::from("home"));
	let other = signal.clone();
	let seen = Rc::new(RefCell::new(Vec::new()));

	let id = other.subscribe({
		let seen = Rc::clone(&seen);
		move |value: &String| seen.borrow_mut().push(value.clone())
	});
	signal.set("servers".to_string());

	assert_eq!(other.get(), "servers");
	assert_eq!(*seen.borrow(), vec!["servers"]);
	assert_eq!(signal.subscriber_count(), 1);

	assert!(signal.unsubscribe(id));
	assert!(!other.unsubscribe(id));
	assert_eq!(other.subscriber_count(), 0);
}

#[rstest]
fn test_listener_redirect_settles_on_last_write() {
	let signal = Signal::new(0);
	let seen = Rc::new(RefCell::new(Vec::new()));

	signal.subscribe({
		let signal = signal.clone();
		move |value: &i32| {
			if *value == 1 {
				signal.set(2);
			}
		}
	});
	signal.subscribe({
		let seen = Rc::clone(&seen);
		move |value: &i32| seen.borrow_mut().push(*value)
	});

	signal.set(1);

	assert_eq!(signal.get(), 2);
	// The nested write replaces the rest of the outer round.
	assert_eq!(*seen.borrow(), vec![2]);
}

#[rstest]
fn test_with_borrows_without_clone() {
	let signal = Signal::new(vec![1, 2, 3]);
	assert_eq!(signal.with(|values| values.len()), 3);

	signal.update(|values| values.push(4));
	assert_eq!(signal.with(|values| values.iter().sum::<i32>()), 10);
}
