use std::{cell::Cell, rc::Rc, sync::atomic::AtomicU32};

use log::info;
use subject_observer::{Message, Subject, SubjectLink};

use crate::{next_id, VALUE_CHANGED};

static INSTANCES: AtomicU32 = AtomicU32::new(0);

/// A subject holding a single integer value.
#[derive(Debug)]
pub struct ValueEntity {
    link: SubjectLink,
    id: u32,
    value: Cell<i32>,
}

impl ValueEntity {
    pub const VALUE_CHANGED: Message = VALUE_CHANGED;

    pub fn new(value: i32) -> Rc<Self> {
        Rc::new_cyclic(|me| ValueEntity {
            link: SubjectLink::bound(me.clone()),
            id: next_id(&INSTANCES),
            value: Cell::new(value),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn value(&self) -> i32 {
        self.value.get()
    }

    /// Updates the value and notifies observers when it actually changes.
    /// Returns how many observers handled the change.
    pub fn set_value(&self, value: i32) -> usize {
        let previous = self.value.replace(value);
        if previous == value {
            return 0;
        }
        info!("value of ValueEntity[{}] changed from {previous} to {value}", self.id);
        self.notify_observers(Self::VALUE_CHANGED)
    }
}

impl Subject for ValueEntity {
    fn subject_link(&self) -> &SubjectLink {
        &self.link
    }
}

impl Drop for ValueEntity {
    fn drop(&mut self) {
        self.detach_all_observers();
    }
}
