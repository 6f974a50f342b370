//! Host callbacks queued while the runner is borrowed.
//!
//! Games publish events from inside `update`, which runs under the runner's
//! `RefCell` borrow. A JS listener invoked there could not call back into
//! any export. Listeners instead [`defer`] their call, and the exports
//! generated by [`export_game!`](crate::export_game) [`run_pending`] once
//! the borrow is released.

use std::cell::RefCell;
use std::collections::VecDeque;

type Callback = Box<dyn FnOnce()>;

thread_local! {
    static PENDING: RefCell<VecDeque<Callback>> = RefCell::new(VecDeque::new());
}

/// Queue `f` to run after the current export returns.
pub fn defer(f: impl FnOnce() + 'static) {
    PENDING.with(|queue| queue.borrow_mut().push_back(Box::new(f)));
}

/// Run queued callbacks in submission order, including any they queue.
/// Returns how many ran.
pub fn run_pending() -> usize {
    let mut ran = 0;
    // Pop one at a time: the queue is not borrowed while a callback runs.
    while let Some(f) = PENDING.with(|queue| queue.borrow_mut().pop_front()) {
        f();
        ran += 1;
    }
    ran
}

pub fn pending_count() -> usize {
    PENDING.with(|queue| queue.borrow().len())
}
