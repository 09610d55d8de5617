use std::{cell::Cell, rc::Rc, sync::atomic::AtomicU32};

use log::info;
use subject_observer::{Message, Notification, Observer, ObserverLink, Subject, SubjectLink};

use crate::{next_id, VALUE_CHANGED};

static INSTANCES: AtomicU32 = AtomicU32::new(0);

/// Both a subject and an observer of other `DualRole`s: it mirrors the value
/// of whatever it observes and passes changes on to its own observers.
///
/// Cycles of `DualRole`s settle because a value that does not change is not
/// passed on.
#[derive(Debug)]
pub struct DualRole {
    subject_link: SubjectLink,
    observer_link: ObserverLink,
    id: u32,
    value: Cell<i32>,
    changes: Cell<u32>,
}

impl DualRole {
    pub const VALUE_CHANGED: Message = VALUE_CHANGED;

    pub fn new(value: i32) -> Rc<Self> {
        Rc::new_cyclic(|me| DualRole {
            subject_link: SubjectLink::bound(me.clone()),
            observer_link: ObserverLink::bound(me.clone()),
            id: next_id(&INSTANCES),
            value: Cell::new(value),
            changes: Cell::new(0),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn value(&self) -> i32 {
        self.value.get()
    }

    /// How many times the value actually changed.
    pub fn changes(&self) -> u32 {
        self.changes.get()
    }

    pub fn set_value(&self, value: i32) {
        let previous = self.value.get();
        if previous == value {
            return;
        }
        info!("DualRole[{}] {previous}=>{value}", self.id);
        self.value.set(value);
        self.changes.set(self.changes.get() + 1);
        self.notify_observers(Self::VALUE_CHANGED);
    }
}

impl Subject for DualRole {
    fn subject_link(&self) -> &SubjectLink {
        &self.subject_link
    }
}

impl Observer for DualRole {
    type Subject = DualRole;

    fn observer_link(&self) -> &ObserverLink {
        &self.observer_link
    }

    fn update(&self, subject: &DualRole, notification: Notification) -> bool {
        if notification.message() != Self::VALUE_CHANGED {
            return false;
        }
        info!(
            "value of DualRole[{}] observed by DualRole[{}] changed to {}",
            subject.id,
            self.id,
            subject.value()
        );
        self.set_value(subject.value());
        true
    }

    fn init(&self, subject: &DualRole) -> bool {
        info!(
            "DualRole[{}]@{} starts observing DualRole[{}]@{}",
            self.id,
            self.value(),
            subject.id,
            subject.value()
        );
        self.set_value(subject.value());
        true
    }

    fn uninit(&self, subject: &DualRole) -> bool {
        info!(
            "DualRole[{}]@{} stops observing DualRole[{}]@{}",
            self.id,
            self.value(),
            subject.id,
            subject.value()
        );
        true
    }
}

impl Drop for DualRole {
    fn drop(&mut self) {
        self.detach();
        self.detach_all_observers();
    }
}
