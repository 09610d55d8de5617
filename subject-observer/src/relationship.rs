//! Attach and detach: the rules that keep both sides of a relationship in
//! agreement.
//!
//! Ordering is load-bearing. On attach the observer's subject handle is set,
//! then the observer is registered with the subject, and only then does
//! `init` run. On detach `uninit` runs first, while the relationship is still
//! whole, then the observer's handle is cleared and it is unregistered.

use std::rc::{Rc, Weak};

use log::{debug, trace, warn};

use crate::{
    error::{LinkError, LinkResult, Role},
    link::{addr, ObserverHandle, ObserverLink, ObserverNode, SubjectNode},
};

pub(crate) fn refuse<T>(error: LinkError) -> Result<T, LinkError> {
    debug!("Relationship change refused: {error}");
    Err(error)
}

fn observer_handle(observer: &dyn ObserverNode) -> Result<&ObserverHandle, LinkError> {
    observer
        .link()
        .handle()
        .filter(|handle| handle.address() == addr(observer))
        .map_or_else(|| refuse(LinkError::InvalidReference(Role::Observer)), Ok)
}

fn subject_handle(subject: &dyn SubjectNode) -> Result<&Weak<dyn SubjectNode>, LinkError> {
    let link = subject.link();
    link.handle()
        .filter(|_| link.is_handle_of(addr(subject)))
        .map_or_else(|| refuse(LinkError::InvalidReference(Role::Subject)), Ok)
}

pub(crate) fn attach(observer: &dyn ObserverNode, subject: &dyn SubjectNode) -> LinkResult {
    let handle = observer_handle(observer)?.clone();
    let me = subject_handle(subject)?.clone();
    if handle.node.strong_count() == 0 {
        return refuse(LinkError::InvalidReference(Role::Observer));
    }
    if me.strong_count() == 0 {
        return refuse(LinkError::InvalidReference(Role::Subject));
    }

    let link = observer.link();
    if link.in_hook() {
        return refuse(LinkError::Reentrant);
    }
    if link.observes(addr(subject)) {
        return refuse(LinkError::DuplicateAttach);
    }

    if let Some(previous) = link.subject() {
        // a subject being torn down still owes this observer its uninit
        let Some(previous) = previous.upgrade() else {
            return refuse(LinkError::InvalidReference(Role::Subject));
        };
        detach(observer, &*previous)?;
    }

    // order matters: the handle is set before registration, and both happen before init
    link.set_subject(Some(me));
    subject.link().push(handle);
    trace!("Observer {:p} attached to subject {:p}", addr(observer), addr(subject));
    link.run_hook(|| observer.on_init(subject));
    Ok(())
}

pub(crate) fn detach(observer: &dyn ObserverNode, subject: &dyn SubjectNode) -> LinkResult {
    observer_handle(observer)?;
    subject_handle(subject)?;

    let link = observer.link();
    if link.in_hook() {
        return refuse(LinkError::Reentrant);
    }
    if !link.observes(addr(subject)) {
        return refuse(LinkError::StaleDetach);
    }

    // order matters: uninit runs while the relationship is still whole
    link.run_hook(|| observer.on_uninit(subject));
    link.set_subject(None);
    subject.link().remove(addr(observer));
    trace!("Observer {:p} detached from subject {:p}", addr(observer), addr(subject));
    Ok(())
}

/// Detaches the observer from whatever it observes. Returns whether a
/// relationship was torn down.
///
/// An observer of a subject that is being torn down stays attached: the
/// subject's own teardown detaches it and runs its `uninit`.
pub(crate) fn detach_current(observer: &dyn ObserverNode) -> bool {
    let Some(current) = observer.link().subject() else {
        return false;
    };
    match current.upgrade() {
        Some(subject) => detach(observer, &*subject).is_ok(),
        None => {
            debug!("Observer {:p} left to the teardown of its subject", addr(observer));
            false
        }
    }
}

/// Detaches every observer, most recently attached first. Never fails:
/// an observer that cannot be detached normally is severed and the failure
/// is logged.
pub(crate) fn detach_all(subject: &dyn SubjectNode) -> usize {
    let mut detached = 0;
    // the list is re-read each round since uninit hooks may change it
    while let Some(handle) = subject.link().last() {
        let outcome = match handle.node.upgrade() {
            Some(observer) => detach(&*observer, subject),
            None => Err(LinkError::InvalidReference(Role::Observer)),
        };
        match outcome {
            Ok(()) => detached += 1,
            Err(error) => {
                warn!(
                    "Forced detach from subject {:p} failed ({error}), severing without uninit",
                    addr(subject)
                );
                sever(subject, &handle);
            }
        }
    }
    detached
}

fn sever(subject: &dyn SubjectNode, handle: &ObserverHandle) {
    subject.link().remove(handle.address());
    if let Some(observer) = handle.node.upgrade() {
        let link = observer.link();
        if link.observes(addr(subject)) {
            link.set_subject(None);
        }
    }
}

pub(crate) fn observers(subject: &dyn SubjectNode) -> Vec<ObserverHandle> {
    subject
        .link()
        .handles()
        .into_iter()
        .filter(|handle| handle.node.strong_count() > 0)
        .collect()
}

pub(crate) fn current_subject(link: &ObserverLink) -> Option<Rc<dyn SubjectNode>> {
    link.subject().as_ref().and_then(Weak::upgrade)
}
