//! Fault boundary around handler invocation.
//!
//! Handlers report recoverable and fatal faults through
//! [`HandlerError::Fault`]. Anything that escapes as a panic is caught here
//! and converted into a fatal [`Fault`], so no failure leaves the dispatcher
//! unhandled. The panic location is captured by a process-wide panic hook.
//! Panics raised inside the boundary are recorded in a thread-local slot and
//! reported only through the fault result; panics anywhere else are handed
//! to the previously installed hook unchanged.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::handler::{
    CommandHandler, Fault, FaultKind, HandlerError, HandlerResult, SourceLocation,
};

/// Fault class reported for handler panics.
pub const PANIC_FAULT_CLASS: &str = "panic";

static PANIC_CAPTURE: OnceCell<()> = OnceCell::new();

thread_local! {
    static LAST_PANIC: RefCell<Option<SourceLocation>> = const { RefCell::new(None) };
    static IN_BOUNDARY: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside the boundary until dropped.
struct BoundaryGuard {
    previous: bool,
}

impl BoundaryGuard {
    fn enter() -> Self {
        Self {
            previous: IN_BOUNDARY.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for BoundaryGuard {
    fn drop(&mut self) {
        IN_BOUNDARY.with(|flag| flag.set(self.previous));
    }
}

/// Invokes `handler` with `payload`, converting panics into fatal faults.
pub fn invoke(handler: &dyn CommandHandler, payload: Value) -> HandlerResult {
    install_panic_capture();
    LAST_PANIC.with(|slot| slot.borrow_mut().take());

    let outcome = {
        let _boundary = BoundaryGuard::enter();
        panic::catch_unwind(AssertUnwindSafe(|| handler.handle(payload)))
    };
    match outcome {
        Ok(result) => result,
        Err(panic) => Err(HandlerError::Fault(fault_from_panic(panic.as_ref()))),
    }
}

fn install_panic_capture() {
    PANIC_CAPTURE.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            record_panic(info.location().map(SourceLocation::from), || previous(info));
        }));
    });
}

/// Keeps boundary panics out of `forward`; everything else goes through it.
fn record_panic(location: Option<SourceLocation>, forward: impl FnOnce()) {
    if IN_BOUNDARY.with(Cell::get) {
        LAST_PANIC.with(|slot| *slot.borrow_mut() = location);
    } else {
        forward();
    }
}

fn fault_from_panic(payload: &(dyn Any + Send)) -> Fault {
    let message = payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-string panic payload"));
    let location = LAST_PANIC
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| SourceLocation::new("unknown", 0));

    Fault {
        kind: FaultKind::Fatal,
        class: String::from(PANIC_FAULT_CLASS),
        message,
        code: 0,
        location,
    }
}
