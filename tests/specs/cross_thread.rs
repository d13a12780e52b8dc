//! Cross-thread specs
//!
//! Handles may be used from any thread; structural changes are applied on
//! the thread that drives the scheduler.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn cancel_from_worker_thread_before_expiry() {
    let mut sim = Sim::new();
    let handle = sim.scheduler.schedule_once_after(ms(50), sim.once("never")).unwrap();

    std::thread::spawn(move || handle.cancel().unwrap())
        .join()
        .unwrap();

    sim.advance(ms(50));
    assert!(sim.fired().is_empty());
    assert!(sim.scheduler.is_idle());
}

#[test]
fn pause_from_worker_thread_takes_effect_next_tick() {
    let mut sim = Sim::new();
    let handle = sim.scheduler.schedule_recurring(ms(100), sim.every("tick")).unwrap();
    sim.advance(ms(100));

    let handle = std::thread::spawn(move || {
        handle.pause().unwrap();
        handle
    })
    .join()
    .unwrap();

    sim.advance(ms(100));
    assert_eq!(sim.fired(), labels(&["tick"]));

    handle.unpause().unwrap();
    sim.advance(ms(100));
    assert_eq!(sim.fired(), labels(&["tick"]));
}

#[test]
fn schedule_through_handle_from_many_threads() {
    let mut sim = Sim::new();
    let scheduler = sim.scheduler.handle();

    let workers: Vec<_> = (0..3)
        .map(|i| {
            let scheduler = scheduler.clone();
            let tick = sim.every(&format!("worker-{i}"));
            std::thread::spawn(move || scheduler.schedule_recurring(ms(100), tick).unwrap())
        })
        .collect();
    let handles: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    sim.advance(Duration::ZERO);
    assert_eq!(sim.scheduler.stats().timers, 1);
    assert_eq!(sim.scheduler.group_len(ms(100)), Some(handles.len()));

    sim.advance(ms(100));
    let mut fired = sim.fired();
    fired.sort();
    assert_eq!(fired, labels(&["worker-0", "worker-1", "worker-2"]));
}

#[test]
fn posted_task_sees_the_scheduler() {
    let mut sim = Sim::new();
    let scheduler = sim.scheduler.handle();
    let ping = sim.once("posted");

    std::thread::spawn(move || {
        scheduler
            .post(move |s| {
                s.schedule_once_after(ms(10), ping).unwrap();
            })
            .unwrap()
    })
    .join()
    .unwrap();

    sim.advance(Duration::ZERO);
    sim.advance(ms(10));
    assert_eq!(sim.fired(), labels(&["posted"]));
}
