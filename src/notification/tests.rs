//! Unit tests for the notification hub's fan-out guarantees.

use super::{ChangeEvent, ChangeKind, NotificationHub};
use crate::board::domain::Title;
use rstest::{fixture, rstest};

#[fixture]
fn hub() -> NotificationHub {
    NotificationHub::new(16)
}

#[fixture]
fn title() -> Title {
    Title::new("Launch checklist").expect("valid title")
}

#[rstest]
fn publish_without_observers_is_not_an_error(hub: NotificationHub, title: Title) {
    assert_eq!(hub.observer_count(), 0);
    hub.publish(ChangeEvent::project_created(&title));
}

#[rstest]
fn observer_receives_events_in_publish_order(hub: NotificationHub, title: Title) {
    let mut observer = hub.subscribe();

    hub.publish(ChangeEvent::task_created(&title));
    hub.publish(ChangeEvent::task_updated(&title));
    hub.publish(ChangeEvent::task_deleted());

    let kinds: Vec<ChangeKind> = std::iter::from_fn(|| observer.try_recv())
        .map(|event| event.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ChangeKind::TaskCreated,
            ChangeKind::TaskUpdated,
            ChangeKind::TaskDeleted
        ]
    );
}

#[rstest]
fn late_observer_receives_no_backlog(hub: NotificationHub, title: Title) {
    hub.publish(ChangeEvent::project_created(&title));
    hub.publish(ChangeEvent::project_deleted());

    let mut late = hub.subscribe();
    assert_eq!(late.try_recv(), None);
}

#[rstest]
fn every_observer_receives_every_event(hub: NotificationHub, title: Title) {
    let mut first = hub.subscribe();
    let mut second = hub.subscribe();
    assert_eq!(hub.observer_count(), 2);

    hub.publish(ChangeEvent::project_updated(&title));

    assert!(first.try_recv().is_some());
    assert!(second.try_recv().is_some());
}

#[rstest]
fn dropped_observer_does_not_affect_remaining_delivery(hub: NotificationHub, title: Title) {
    let mut kept = hub.subscribe();
    let dropped = hub.subscribe();
    drop(dropped);

    hub.publish(ChangeEvent::task_updated(&title));

    let received = kept.try_recv().expect("kept observer receives");
    assert_eq!(received.kind(), ChangeKind::TaskUpdated);
}

#[rstest]
fn summaries_match_the_wire_format(title: Title) {
    assert_eq!(
        ChangeEvent::project_created(&title).summary(),
        "New project \"Launch checklist\" created!"
    );
    assert_eq!(
        ChangeEvent::project_updated(&title).summary(),
        "Project \"Launch checklist\" was updated!"
    );
    assert_eq!(
        ChangeEvent::project_deleted().summary(),
        "A project was deleted!"
    );
    assert_eq!(
        ChangeEvent::task_created(&title).summary(),
        "New task \"Launch checklist\" added to project!"
    );
    assert_eq!(
        ChangeEvent::task_updated(&title).summary(),
        "Task \"Launch checklist\" was updated!"
    );
    assert_eq!(ChangeEvent::task_deleted().summary(), "A task was deleted!");
}
