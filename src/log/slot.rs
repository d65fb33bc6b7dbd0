//! Legacy "last error" slot.
//!
//! Every fallible operation in this crate returns a [`Result`], which is the
//! supported way to observe failures. The slot only exists for callers that
//! poll for the most recent failure message after the fact. It is kept per
//! thread; a failure on one thread is never visible from another, and a later
//! failure on the same thread overwrites an earlier one.
use super::Error;
use std::cell::RefCell;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Return the message of the most recent failure on the calling thread.
///
/// Legacy accessor. Prefer inspecting the [`Error`] returned by the failing
/// call, since the slot is overwritten by every subsequent failure.
///
/// # Examples
///
/// ```
/// assert!(stache::parse("{{#a}}{{/b}}").is_err());
/// assert!(stache::last_error().is_some());
/// ```
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Store the message of a failed result in the slot, passing the result
/// through unchanged.
pub fn record<T>(result: Result<T, Error>) -> Result<T, Error> {
    if let Err(error) = &result {
        let message = error.message();
        LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
    }

    result
}
