use std::{cell::RefCell, rc::Rc};

use log::info;
#[cfg(test)]
use mockall::automock;

/// What a monitor saw, tagged with the ids of the monitor and the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Started { monitor: u32, entity: u32, value: i32 },
    Observed { monitor: u32, entity: u32, value: i32 },
    Stopped { monitor: u32, entity: u32, value: i32 },
}

#[cfg_attr(test, automock)]
pub trait Journal {
    fn record(&self, observation: Observation);
}

/// Writes observations to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogJournal;

impl Journal for LogJournal {
    fn record(&self, observation: Observation) {
        match observation {
            Observation::Started {
                monitor,
                entity,
                value,
            } => info!("ValueMonitor[{monitor}] starts observing ValueEntity[{entity}]@{value}"),
            Observation::Observed {
                monitor,
                entity,
                value,
            } => info!(
                "value of ValueEntity[{entity}] observed by ValueMonitor[{monitor}] changed to {value}"
            ),
            Observation::Stopped {
                monitor,
                entity,
                value,
            } => info!("ValueMonitor[{monitor}] stops observing ValueEntity[{entity}]@{value}"),
        }
    }
}

/// Keeps observations for later inspection. Clones share the same storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryJournal {
    observations: Rc<RefCell<Vec<Observation>>>,
}

impl MemoryJournal {
    pub fn observations(&self) -> Vec<Observation> {
        self.observations.borrow().clone()
    }

    /// Values reported through `Observed`, in order.
    pub fn observed_values(&self) -> Vec<i32> {
        self.observations
            .borrow()
            .iter()
            .filter_map(|observation| match observation {
                Observation::Observed { value, .. } => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl Journal for MemoryJournal {
    fn record(&self, observation: Observation) {
        self.observations.borrow_mut().push(observation);
    }
}

impl<A: Journal, B: Journal> Journal for (A, B) {
    fn record(&self, observation: Observation) {
        self.0.record(observation);
        self.1.record(observation);
    }
}
