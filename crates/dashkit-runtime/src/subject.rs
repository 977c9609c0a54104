#![forbid(unsafe_code)]

//! Single-topic notification channel.
//!
//! # Design
//!
//! [`Subject<T>`] keeps an ordered list of [`Observer<T>`] handles. Observers
//! are identified by the address of their `Rc`, so detaching needs the same
//! handle that was attached (closures have no usable equality).
//!
//! # Invariants
//!
//! 1. Observers are notified in attachment order.
//! 2. `notify` works on a snapshot of the observer list taken before the first
//!    call: observers may attach or detach (themselves or others) from inside
//!    a callback without disturbing the iteration in progress. Changes take
//!    effect on the next `notify`.
//! 3. Detaching an observer that is not attached is a no-op.
//!
//! # Failure Modes
//!
//! - **Unbounded re-entrancy**: an observer that calls `notify` on the same
//!   subject recurses without limit. Nothing here guards against it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Receiver of values published on a [`Subject`].
pub trait Observer<T: ?Sized> {
    fn notify(&self, value: &T);
}

impl<T: ?Sized, F: Fn(&T)> Observer<T> for F {
    fn notify(&self, value: &T) {
        self(value);
    }
}

/// Shared handle to an observer, as attached to a [`Subject`].
pub type ObserverRef<T> = Rc<dyn Observer<T>>;

/// Wrap a closure as an [`ObserverRef`].
pub fn observer<T: ?Sized + 'static>(f: impl Fn(&T) + 'static) -> ObserverRef<T> {
    Rc::new(f)
}

fn same_observer<T: ?Sized>(a: &ObserverRef<T>, b: &ObserverRef<T>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// A single-topic observer registry.
pub struct Subject<T: ?Sized> {
    observers: RefCell<Vec<ObserverRef<T>>>,
}

impl<T: ?Sized> Default for Subject<T> {
    fn default() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("observer_count", &self.len())
            .finish()
    }
}

impl<T: ?Sized> Subject<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`. Attaching the same handle twice delivers twice.
    pub fn attach(&self, observer: ObserverRef<T>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Remove every registration of `observer`; returns whether any existed.
    pub fn detach(&self, observer: &ObserverRef<T>) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|existing| !same_observer(existing, observer));
        observers.len() != before
    }

    /// Deliver `value` to every observer attached when the call started.
    ///
    /// Returns the number of observers called.
    pub fn notify(&self, value: &T) -> usize {
        let snapshot: Vec<ObserverRef<T>> = self.observers.borrow().clone();
        for observer in &snapshot {
            observer.notify(value);
        }
        snapshot.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn notifies_in_attachment_order() {
        let subject = Subject::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ['A', 'B', 'C'] {
            let log = Rc::clone(&log);
            subject.attach(observer(move |v: &u32| log.borrow_mut().push((tag, *v))));
        }
        assert_eq!(subject.notify(&7), 3);
        assert_eq!(*log.borrow(), vec![('A', 7), ('B', 7), ('C', 7)]);
    }

    #[test]
    fn detach_removes_exact_handle() {
        let subject = Subject::<u32>::new();
        let hits = Rc::new(Cell::new(0));
        let hits_a = Rc::clone(&hits);
        let a = observer(move |_: &u32| hits_a.set(hits_a.get() + 1));
        let b = observer(|_: &u32| {});
        subject.attach(Rc::clone(&a));
        subject.attach(Rc::clone(&b));

        assert!(subject.detach(&a));
        subject.notify(&1);
        assert_eq!(hits.get(), 0);
        assert_eq!(subject.len(), 1);
    }

    #[test]
    fn detach_unknown_is_noop() {
        let subject = Subject::<u32>::new();
        let stranger = observer(|_: &u32| {});
        assert!(!subject.detach(&stranger));
        assert!(subject.is_empty());
    }

    #[test]
    fn self_detach_during_notify_keeps_iteration_intact() {
        let subject = Rc::new(Subject::<u32>::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let slot: Rc<RefCell<Option<ObserverRef<u32>>>> = Rc::new(RefCell::new(None));
        let first = {
            let subject = Rc::clone(&subject);
            let slot = Rc::clone(&slot);
            let log = Rc::clone(&log);
            observer(move |_: &u32| {
                log.borrow_mut().push("first");
                if let Some(me) = slot.borrow().as_ref() {
                    subject.detach(me);
                }
            })
        };
        *slot.borrow_mut() = Some(Rc::clone(&first));
        subject.attach(first);
        let log_second = Rc::clone(&log);
        subject.attach(observer(move |_: &u32| log_second.borrow_mut().push("second")));

        subject.notify(&1);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        subject.notify(&2);
        assert_eq!(*log.borrow(), vec!["first", "second", "second"]);
    }

    #[test]
    fn attach_during_notify_takes_effect_next_time() {
        let subject = Rc::new(Subject::<u32>::new());
        let late_hits = Rc::new(Cell::new(0));
        {
            let subject_inner = Rc::clone(&subject);
            let late_hits = Rc::clone(&late_hits);
            subject.attach(observer(move |v: &u32| {
                if *v == 1 {
                    let late_hits = Rc::clone(&late_hits);
                    subject_inner.attach(observer(move |_: &u32| late_hits.set(late_hits.get() + 1)));
                }
            }));
        }
        subject.notify(&1);
        assert_eq!(late_hits.get(), 0);
        subject.notify(&2);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn typed_observer_impl() {
        struct Counter(Cell<u32>);
        impl Observer<str> for Counter {
            fn notify(&self, value: &str) {
                self.0.set(self.0.get() + value.len() as u32);
            }
        }
        let counter = Rc::new(Counter(Cell::new(0)));
        let subject = Subject::<str>::new();
        let handle: ObserverRef<str> = counter.clone();
        subject.attach(Rc::clone(&handle));
        subject.notify("four");
        assert_eq!(counter.0.get(), 4);
        assert!(subject.detach(&handle));
    }
}
