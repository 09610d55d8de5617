use std::{cell::Cell, rc::Rc};

use dipstick::{Counter, Gauge, InputScope};
use log::debug;
use subject_observer::{Notification, Observer, ObserverLink};

use crate::ValueEntity;

/// Forwards the value of the observed [`ValueEntity`] to a gauge and counts
/// the change notifications it receives.
pub struct MetricsMonitor {
    link: ObserverLink,
    value: Gauge,
    notifications: Counter,
    observed: Cell<usize>,
    last_value: Cell<Option<i32>>,
}

impl MetricsMonitor {
    pub fn new(scope: &impl InputScope) -> Rc<Self> {
        Rc::new_cyclic(|me| MetricsMonitor {
            link: ObserverLink::bound(me.clone()),
            value: scope.gauge("entity-value"),
            notifications: scope.counter("notifications"),
            observed: Cell::new(0),
            last_value: Cell::new(None),
        })
    }

    /// Number of change notifications handled so far.
    pub fn observed(&self) -> usize {
        self.observed.get()
    }

    /// Last value forwarded to the gauge.
    pub fn last_value(&self) -> Option<i32> {
        self.last_value.get()
    }

    fn forward(&self, value: i32) {
        self.value.value(value);
        self.last_value.set(Some(value));
    }
}

impl Observer for MetricsMonitor {
    type Subject = ValueEntity;

    fn observer_link(&self) -> &ObserverLink {
        &self.link
    }

    fn update(&self, subject: &ValueEntity, notification: Notification) -> bool {
        if notification.message() != ValueEntity::VALUE_CHANGED {
            return false;
        }
        self.notifications.count(1);
        self.observed.set(self.observed.get() + 1);
        self.forward(subject.value());
        true
    }

    fn init(&self, subject: &ValueEntity) -> bool {
        debug!("Publishing metrics of ValueEntity[{}]", subject.id());
        self.forward(subject.value());
        true
    }
}

impl Drop for MetricsMonitor {
    fn drop(&mut self) {
        self.detach();
    }
}
