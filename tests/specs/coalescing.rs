//! Interval coalescing specs
//!
//! Recurring callbacks with equal intervals share one timer; pause, cancel
//! and unpause change membership without disturbing siblings.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn three_callbacks_one_timer_lifecycle() {
    let mut sim = Sim::new();
    let a = sim.scheduler.schedule_recurring(ms(100), sim.every("A")).unwrap();
    let b = sim.scheduler.schedule_recurring(ms(100), sim.every("B")).unwrap();
    let c = sim.scheduler.schedule_recurring(ms(100), sim.every("C")).unwrap();
    assert_eq!(sim.scheduler.stats().timers, 1);

    sim.advance(ms(100));
    assert_eq!(sim.fired(), labels(&["A", "B", "C"]));

    b.pause().unwrap();
    sim.advance(ms(100));
    assert_eq!(sim.fired(), labels(&["A", "C"]));

    a.cancel().unwrap();
    c.cancel().unwrap();
    b.unpause().unwrap();
    sim.advance(ms(100));
    assert_eq!(sim.fired(), labels(&["B"]));
    assert_eq!(sim.scheduler.group_len(ms(100)), Some(1));
}

#[test]
fn distinct_intervals_get_distinct_timers() {
    let mut sim = Sim::new();
    let _fast = sim.scheduler.schedule_recurring(ms(50), sim.every("fast")).unwrap();
    let _slow = sim.scheduler.schedule_recurring(ms(150), sim.every("slow")).unwrap();
    assert_eq!(sim.scheduler.stats().timers, 2);

    for _ in 0..3 {
        sim.advance(ms(50));
    }
    assert_eq!(sim.fired(), labels(&["fast", "fast", "fast", "slow"]));
}

#[test]
fn last_cancel_releases_the_timer() {
    let mut sim = Sim::new();
    let only = sim.scheduler.schedule_recurring(ms(100), sim.every("only")).unwrap();
    only.cancel().unwrap();
    sim.advance(ms(100));

    assert!(sim.fired().is_empty());
    assert_eq!(sim.scheduler.stats().timers, 0);
    assert!(sim.scheduler.is_idle());
}

#[test]
fn paused_members_keep_the_group_alive() {
    let mut sim = Sim::new();
    let a = sim.scheduler.schedule_recurring(ms(100), sim.every("A")).unwrap();
    a.pause().unwrap();

    for _ in 0..5 {
        sim.advance(ms(100));
    }
    assert!(sim.fired().is_empty());
    assert_eq!(sim.scheduler.stats().timers, 1);
    assert_eq!(a.state(), RecurringState::Paused);
}

#[test]
fn callback_can_cancel_a_later_sibling_in_the_same_tick() {
    let mut sim = Sim::new();
    let log = sim.log();
    let victim: Arc<Mutex<Option<tempo_engine::RecurringHandle>>> = Arc::default();
    let slot = Arc::clone(&victim);

    let _killer = sim
        .scheduler
        .schedule_recurring(ms(100), move |_| {
            log.lock().unwrap().push("killer".into());
            if let Some(handle) = slot.lock().unwrap().take() {
                handle.cancel().unwrap();
            }
        })
        .unwrap();
    let target = sim.scheduler.schedule_recurring(ms(100), sim.every("target")).unwrap();
    *victim.lock().unwrap() = Some(target);

    sim.advance(ms(100));
    sim.advance(ms(100));
    assert_eq!(sim.fired(), labels(&["killer", "killer"]));
}

#[test]
fn zero_interval_is_an_error() {
    let mut sim = Sim::new();
    let err = sim
        .scheduler
        .schedule_recurring(Duration::ZERO, sim.every("spin"))
        .unwrap_err();
    assert_eq!(err, ScheduleError::ZeroInterval);
}
