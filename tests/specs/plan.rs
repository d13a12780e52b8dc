//! Schedule plan specs

use crate::prelude::*;
use crate::prelude::assert_eq;
use std::io::Write;
use tempo_engine::{Firing, SchedulePlan};

#[test]
fn plan_file_installs_coalesced_entries() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[recurring]]
name = "a"
interval = "100ms"

[[recurring]]
name = "b"
interval = "100ms"
limit = 1

[[once]]
name = "c"
after = "50ms"
"#
    )
    .unwrap();

    let plan = SchedulePlan::load(file.path()).unwrap();
    let mut sim = Sim::new();
    let log = sim.log();
    plan.install(
        &mut sim.scheduler,
        Arc::new(move |f: &Firing| log.lock().unwrap().push(f.name.clone())),
    )
    .unwrap();
    assert_eq!(sim.scheduler.stats().timers, 2);

    sim.advance(ms(50));
    sim.advance(ms(50));
    sim.advance(ms(100));
    assert_eq!(sim.fired(), labels(&["c", "a", "b", "a"]));
}

#[test]
fn invalid_plan_is_rejected() {
    let err = SchedulePlan::parse("[[recurring]]\nname = \"x\"\ninterval = \"0s\"").unwrap_err();
    assert!(err.to_string().contains("zero interval"));
}
