//! # Untyped boundary adapter.
//!
//! The typed submission path checks validity of work at compile time: a
//! plain value or an uninvoked function does not implement
//! [`Work`](crate::Work), so it cannot be submitted at all. Systems that
//! accept work from an untyped boundary (plugins, scripting bridges,
//! dynamic dispatch tables) lose that guarantee, so this module provides
//! the one place where validation happens at runtime instead.
//!
//! A [`WorkPayload`] is just `Box<dyn Any + Send>`. [`payload`] wraps a
//! typed descriptor into one; `Scheduler::submit_untyped` coerces it back
//! and rejects everything else with
//! [`SubmitError::InvalidWork`](crate::SubmitError::InvalidWork) before any
//! job is created.

use std::any::Any;

use crate::error::SubmitError;
use crate::jobs::work::{BoxWork, Work};

/// Type-erased payload accepted at the untyped boundary.
pub type WorkPayload = Box<dyn Any + Send>;

/// Erases a valid work descriptor into a boundary payload.
pub fn payload<T: 'static>(work: impl Work<T>) -> WorkPayload {
    let boxed: BoxWork<T> = Box::new(work);
    Box::new(boxed)
}

/// Coerces a boundary payload back into a work descriptor.
///
/// The only accepted concrete type is `BoxWork<T>` as produced by
/// [`payload`]; anything else — a plain value, an uninvoked function, a
/// descriptor for a different output type — is rejected.
pub(crate) fn coerce<T: 'static>(raw: WorkPayload) -> Result<BoxWork<T>, SubmitError> {
    match raw.downcast::<BoxWork<T>>() {
        Ok(work) => Ok(*work),
        Err(_) => Err(SubmitError::InvalidWork {
            reason: "payload is not an async work descriptor",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use crate::jobs::work::WorkFn;

    #[test]
    fn test_coerce_accepts_wrapped_work() {
        let raw = payload(WorkFn::new(|_ctx| async move { Ok::<_, JobError>(5) }));
        assert!(coerce::<i32>(raw).is_ok());
    }

    #[test]
    fn test_coerce_rejects_plain_value() {
        assert!(matches!(
            coerce::<i32>(Box::new(42)),
            Err(SubmitError::InvalidWork { .. })
        ));
    }

    #[test]
    fn test_coerce_rejects_uninvoked_function() {
        fn plain() -> i32 {
            7
        }
        assert!(matches!(
            coerce::<i32>(Box::new(plain as fn() -> i32)),
            Err(SubmitError::InvalidWork { .. })
        ));
    }

    #[test]
    fn test_coerce_rejects_mismatched_output_type() {
        let raw = payload(WorkFn::new(|_ctx| async move {
            Ok::<_, JobError>("text".to_string())
        }));
        assert!(coerce::<i32>(raw).is_err());
    }
}
