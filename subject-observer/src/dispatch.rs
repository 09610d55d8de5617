//! Synchronous broadcast of a message code to attached observers.
//!
//! Dispatch works on a snapshot of the membership list taken before the
//! first delivery. Observers attached while a dispatch is in progress are
//! not reached by it. Observers detached (or dropped) while it is in
//! progress are skipped when their turn comes. Everything else is reached
//! exactly once, in attachment order.

use log::trace;

use crate::link::{addr, SubjectNode};

/// Opaque message code; its meaning belongs to the concrete subject.
pub type Message = i64;

/// What an observer's `update` receives.
///
/// Only the dispatcher can build one, and it cannot be duplicated, so
/// `update` cannot be driven from anywhere else.
///
/// ```compile_fail
/// use subject_observer::Notification;
///
/// fn replay(notification: Notification) -> (Notification, Notification) {
///     (notification, notification)
/// }
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Notification {
    message: Message,
}

impl Notification {
    pub(crate) fn new(message: Message) -> Self {
        Notification { message }
    }

    pub fn message(&self) -> Message {
        self.message
    }
}

/// Returns how many observers reported the message as handled.
pub(crate) fn notify(subject: &dyn SubjectNode, message: Message) -> usize {
    let link = subject.link();
    link.prune();
    let snapshot = link.handles();
    let subject_address = addr(subject);

    let mut delivered = 0;
    let mut handled = 0;
    for handle in &snapshot {
        let Some(observer) = handle.node.upgrade() else {
            continue;
        };
        if !observer.link().observes(subject_address) {
            continue;
        }
        delivered += 1;
        if observer.on_update(subject, Notification::new(message)) {
            handled += 1;
        }
    }

    trace!(
        "Subject {:p} sent message {message} to {delivered}/{} observer(s), {handled} handled",
        subject_address,
        snapshot.len()
    );
    handled
}
