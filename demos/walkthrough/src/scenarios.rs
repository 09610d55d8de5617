use std::rc::Rc;

use anyhow::{ensure, Context, Result};
use dipstick::{Input, Log};
use entities::{
    DualRole, LogJournal, MemoryJournal, MetricsMonitor, Observation, ValueEntity, ValueMonitor,
};
use log::info;
use subject_observer::{Observer, Subject};

use crate::config::app::{AppConfig, Scenario};

type RecordingMonitor = ValueMonitor<(LogJournal, MemoryJournal)>;

fn recording_monitor() -> (Rc<RecordingMonitor>, MemoryJournal) {
    let memory = MemoryJournal::default();
    (ValueMonitor::new((LogJournal, memory.clone())), memory)
}

pub fn run(config: &AppConfig) -> Result<()> {
    match config.scenario {
        Scenario::All => {
            entity_monitor(config.target_value)?;
            dual_role(&config.dual_role_values)?;
            metrics(config.target_value)
        }
        Scenario::EntityMonitor => entity_monitor(config.target_value),
        Scenario::DualRole => dual_role(&config.dual_role_values),
        Scenario::Metrics => metrics(config.target_value),
    }
}

/// Two monitors watch one entity while it is driven to `target`, then one
/// of them leaves, then the entity goes away under a still-attached monitor.
fn entity_monitor(target: i32) -> Result<()> {
    info!("Scenario {} started", Scenario::EntityMonitor);
    let entity = ValueEntity::new(0);
    let (first, first_journal) = recording_monitor();
    let (second, second_journal) = recording_monitor();
    first.attach_to(&entity)?;
    second.attach_to(&entity)?;

    for value in 1..=target {
        entity.set_value(value);
        ensure!(
            entity.observers().len() == 2,
            "ValueEntity[{}] lost an observer",
            entity.id()
        );
    }
    let expected = (1..=target).collect::<Vec<_>>();
    ensure!(
        first_journal.observed_values() == expected,
        "ValueMonitor[{}] missed a change",
        first.id()
    );
    ensure!(
        second_journal.observed_values() == expected,
        "ValueMonitor[{}] missed a change",
        second.id()
    );

    entity.detach_observer(&*first)?;
    ensure!(entity.observer_count() == 1, "Detach left a stale entry");
    ensure!(first.current_subject().is_none(), "Detach left a subject");
    ensure!(
        second
            .current_subject()
            .is_some_and(|subject| Rc::ptr_eq(&subject, &entity)),
        "ValueMonitor[{}] lost its subject",
        second.id()
    );

    let entity_id = entity.id();
    drop(entity);
    ensure!(
        !second.is_attached(),
        "ValueMonitor[{}] outlived its subject while attached",
        second.id()
    );
    ensure!(
        second_journal.observations().last()
            == Some(&Observation::Stopped {
                monitor: second.id(),
                entity: entity_id,
                value: target,
            }),
        "ValueMonitor[{}] was not stopped by the teardown",
        second.id()
    );
    info!("Scenario {} passed", Scenario::EntityMonitor);
    Ok(())
}

/// Three dual-role entities watching each other in a triangle.
fn dual_role(values: &[i32]) -> Result<()> {
    info!("Scenario {} started", Scenario::DualRole);
    let [first, second, third] = <[i32; 3]>::try_from(values)
        .context("Expected three dual-role values")?
        .map(DualRole::new);
    third.attach_to(&second)?;
    first.attach_observer(&*second)?;
    first.attach_to(&third)?;

    let settled = |expected: i32| {
        [&first, &second, &third]
            .iter()
            .all(|entity| entity.value() == expected)
    };
    let start = first.value();
    ensure!(settled(start), "The triangle did not settle on one value");

    let base = values.iter().copied().max().unwrap_or_default();
    for (entity, value) in [&first, &second, &third].into_iter().zip(1..) {
        entity.set_value(base + value);
        ensure!(
            settled(base + value),
            "DualRole[{}] did not propagate its change",
            entity.id()
        );
    }
    info!("Scenario {} passed", Scenario::DualRole);
    Ok(())
}

/// A metrics monitor publishing every observed value.
fn metrics(target: i32) -> Result<()> {
    info!("Scenario {} started", Scenario::Metrics);
    let scope = Log::to_log().level(log::Level::Info).metrics();
    let entity = ValueEntity::new(0);
    let monitor = MetricsMonitor::new(&scope);
    monitor.attach_to(&entity)?;

    for value in 1..=target {
        entity.set_value(value);
    }
    ensure!(
        monitor.observed() == usize::try_from(target)?,
        "Metrics missed a change"
    );
    ensure!(
        monitor.last_value() == Some(target),
        "Metrics did not publish the last value"
    );
    info!("Scenario {} passed", Scenario::Metrics);
    Ok(())
}
