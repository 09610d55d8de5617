use std::{any::Any, rc::Rc};

use crate::{
    dispatch::{self, Message, Notification},
    error::{LinkError, LinkResult, Role},
    link::{addr, ObserverLink, ObserverNode, SubjectLink},
    relationship,
};

/// Something observers can attach to.
///
/// Implementors embed a [`SubjectLink`] bound to their own `Rc` and, in
/// their `Drop`, call [`Subject::detach_all_observers`] so that every
/// observer gets its `uninit` before the subject goes away.
pub trait Subject: Any {
    fn subject_link(&self) -> &SubjectLink;

    fn attach_observer(&self, observer: &dyn Observer<Subject = Self>) -> LinkResult
    where
        Self: Sized,
    {
        relationship::attach(&*resolve(observer)?, self)
    }

    fn detach_observer(&self, observer: &dyn Observer<Subject = Self>) -> LinkResult
    where
        Self: Sized,
    {
        relationship::detach(&*resolve(observer)?, self)
    }

    /// Live observers in attachment order.
    fn observers(&self) -> Vec<Rc<dyn Observer<Subject = Self>>>
    where
        Self: Sized,
    {
        relationship::observers(self)
            .iter()
            .filter_map(|handle| handle.typed::<Self>())
            .collect()
    }

    fn observer_count(&self) -> usize {
        self.subject_link().live_count()
    }

    /// Delivers `message` to every attached observer and returns how many
    /// of them handled it.
    fn notify_observers(&self, message: Message) -> usize
    where
        Self: Sized,
    {
        dispatch::notify(self, message)
    }

    /// Detaches every observer, most recently attached first, and returns
    /// how many were detached with their `uninit` hook.
    fn detach_all_observers(&self) -> usize
    where
        Self: Sized,
    {
        relationship::detach_all(self)
    }
}

/// Something that watches at most one subject at a time.
///
/// Implementors embed an [`ObserverLink`] bound to their own `Rc` and call
/// [`Observer::detach`] from their `Drop`.
pub trait Observer: Any {
    type Subject: Subject;

    fn observer_link(&self) -> &ObserverLink;

    /// Reacts to a message from the observed subject. Returns whether the
    /// message was handled.
    fn update(&self, subject: &Self::Subject, notification: Notification) -> bool;

    /// Runs right after attaching. Returns whether anything was done.
    fn init(&self, _subject: &Self::Subject) -> bool {
        false
    }

    /// Runs right before detaching. Returns whether anything was done.
    fn uninit(&self, _subject: &Self::Subject) -> bool {
        false
    }

    fn attach_to(&self, subject: &Self::Subject) -> LinkResult
    where
        Self: Sized,
    {
        relationship::attach(self, subject)
    }

    fn detach_from(&self, subject: &Self::Subject) -> LinkResult
    where
        Self: Sized,
    {
        relationship::detach(self, subject)
    }

    /// Detaches from the current subject, if any. Returns whether a
    /// relationship was torn down.
    fn detach(&self) -> bool
    where
        Self: Sized,
    {
        relationship::detach_current(self)
    }

    fn current_subject(&self) -> Option<Rc<Self::Subject>> {
        relationship::current_subject(self.observer_link())?
            .into_any()
            .downcast::<Self::Subject>()
            .ok()
    }

    fn is_attached(&self) -> bool {
        self.observer_link().is_attached()
    }
}

fn resolve<S: Subject>(
    observer: &dyn Observer<Subject = S>,
) -> Result<Rc<dyn ObserverNode>, LinkError> {
    observer
        .observer_link()
        .handle()
        .filter(|handle| handle.address() == addr(observer))
        .and_then(|handle| handle.node.upgrade())
        .map_or_else(|| relationship::refuse(LinkError::InvalidReference(Role::Observer)), Ok)
}
