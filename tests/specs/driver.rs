//! Async driver specs
//!
//! `run_until` sleeps until the next deadline and wakes for posts from
//! other tasks.

use crate::prelude::*;
use crate::prelude::assert_eq;
use tempo_engine::TokioClock;

#[tokio::test(start_paused = true)]
async fn runs_until_stop_future() {
    let mut scheduler = Scheduler::with_clock(TokioClock);
    let count = Arc::new(Mutex::new(0));
    let seen = Arc::clone(&count);
    let _tick = scheduler
        .schedule_recurring(ms(100), move |_| *seen.lock().unwrap() += 1)
        .unwrap();

    scheduler.run_until(tokio::time::sleep(ms(1050))).await;
    assert_eq!(*count.lock().unwrap(), 10);
}

#[tokio::test(start_paused = true)]
async fn wakes_for_work_posted_by_another_task() {
    let mut scheduler = Scheduler::with_clock(TokioClock);
    let handle = scheduler.handle();
    let fired = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&fired);

    tokio::spawn(async move {
        tokio::time::sleep(ms(30)).await;
        handle
            .schedule_once_after(ms(20), move |_| *flag.lock().unwrap() = true)
            .unwrap();
    });

    scheduler.run_until(tokio::time::sleep(ms(100))).await;
    assert!(*fired.lock().unwrap());
    assert!(scheduler.is_idle());
}

#[tokio::test(start_paused = true)]
async fn shutdown_ends_the_run() {
    let mut scheduler = Scheduler::with_clock(TokioClock);
    let handle = scheduler.handle();
    scheduler
        .schedule_once_after(ms(40), move |_| handle.shutdown())
        .unwrap();

    scheduler.run_until(std::future::pending()).await;
    assert_eq!(
        scheduler.schedule_once_after(ms(1), |_| {}).unwrap_err(),
        ScheduleError::Reactor(tempo_engine::ReactorError::Shutdown)
    );
}
