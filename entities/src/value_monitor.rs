use std::{rc::Rc, sync::atomic::AtomicU32};

use subject_observer::{Notification, Observer, ObserverLink};

use crate::{next_id, Journal, LogJournal, Observation, ValueEntity};

static INSTANCES: AtomicU32 = AtomicU32::new(0);

/// Watches a [`ValueEntity`] and reports what it sees to a [`Journal`].
pub struct ValueMonitor<J: Journal + 'static = LogJournal> {
    link: ObserverLink,
    id: u32,
    journal: J,
}

impl<J: Journal + 'static> ValueMonitor<J> {
    pub fn new(journal: J) -> Rc<Self> {
        Rc::new_cyclic(|me| ValueMonitor {
            link: ObserverLink::bound(me.clone()),
            id: next_id(&INSTANCES),
            journal,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl<J: Journal + 'static> Observer for ValueMonitor<J> {
    type Subject = ValueEntity;

    fn observer_link(&self) -> &ObserverLink {
        &self.link
    }

    fn update(&self, subject: &ValueEntity, notification: Notification) -> bool {
        if notification.message() != ValueEntity::VALUE_CHANGED {
            return false;
        }
        self.journal.record(Observation::Observed {
            monitor: self.id,
            entity: subject.id(),
            value: subject.value(),
        });
        true
    }

    fn init(&self, subject: &ValueEntity) -> bool {
        self.journal.record(Observation::Started {
            monitor: self.id,
            entity: subject.id(),
            value: subject.value(),
        });
        true
    }

    fn uninit(&self, subject: &ValueEntity) -> bool {
        self.journal.record(Observation::Stopped {
            monitor: self.id,
            entity: subject.id(),
            value: subject.value(),
        });
        true
    }
}

impl<J: Journal + 'static> Drop for ValueMonitor<J> {
    fn drop(&mut self) {
        self.detach();
    }
}
