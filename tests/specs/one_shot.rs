//! One-shot specs
//!
//! A deferred call fires once, may reschedule itself from its callback,
//! and is removed when it finishes or is canceled.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn fires_once_then_is_removed() {
    let mut sim = Sim::new();
    let handle = sim.scheduler.schedule_once_after(ms(50), sim.once("ping")).unwrap();

    sim.advance(ms(50));
    sim.advance(ms(50));
    assert_eq!(sim.fired(), labels(&["ping"]));
    assert!(!sim.scheduler.contains(handle.id()));
}

#[test]
fn self_reschedule_fires_again_without_duplicates() {
    let mut sim = Sim::new();
    let log = sim.log();
    let mut remaining = 2;
    sim.scheduler
        .schedule_once_after(ms(10), move |call: &mut DeferredCall| {
            log.lock().unwrap().push("retry".into());
            if remaining > 0 {
                remaining -= 1;
                call.reset_after(ms(10)).unwrap();
            }
        })
        .unwrap();

    for _ in 0..6 {
        sim.advance(ms(10));
    }
    assert_eq!(sim.fired(), labels(&["retry", "retry", "retry"]));
    assert!(sim.scheduler.is_idle());
}

#[test]
fn rescheduling_into_the_past_ends_the_call() {
    let mut sim = Sim::new();
    let log = sim.log();
    let start = sim.scheduler.now();
    sim.scheduler
        .schedule_once_after(ms(20), move |call: &mut DeferredCall| {
            log.lock().unwrap().push("stale".into());
            call.reset_at(start).unwrap();
        })
        .unwrap();

    sim.advance(ms(20));
    sim.advance(ms(20));
    assert_eq!(sim.fired(), labels(&["stale"]));
    assert!(sim.scheduler.is_idle());
}

#[test]
fn reset_before_expiry_moves_the_deadline() {
    let mut sim = Sim::new();
    let handle = sim.scheduler.schedule_once_after(ms(100), sim.once("late")).unwrap();

    sim.advance(ms(90));
    handle.reset_after(ms(100)).unwrap();
    sim.advance(ms(10));
    assert!(sim.fired().is_empty());

    sim.advance(ms(90));
    assert_eq!(sim.fired(), labels(&["late"]));
}

#[test]
fn canceled_before_expiry_never_fires() {
    let mut sim = Sim::new();
    let handle = sim.scheduler.schedule_once_after(ms(20), sim.once("never")).unwrap();
    handle.cancel().unwrap();

    sim.advance(ms(100));
    assert!(sim.fired().is_empty());
    assert!(sim.scheduler.is_idle());
}

#[test]
fn finished_handle_reports_released() {
    let mut sim = Sim::new();
    let handle = sim.scheduler.schedule_once_after(ms(5), sim.once("done")).unwrap();
    sim.advance(ms(5));

    assert_eq!(handle.reset_after(ms(5)), Err(ScheduleError::Released));
}

#[test]
fn expirations_run_in_deadline_order() {
    let mut sim = Sim::new();
    sim.scheduler.schedule_once_after(ms(30), sim.once("third")).unwrap();
    sim.scheduler.schedule_once_after(ms(10), sim.once("first")).unwrap();
    sim.scheduler.schedule_once_after(ms(20), sim.once("second")).unwrap();

    sim.advance(ms(30));
    assert_eq!(sim.fired(), labels(&["first", "second", "third"]));
}
