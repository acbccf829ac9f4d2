//! The calendar shipped in `calendars/` must stay valid

use freeze_calendar::load_calendar;
use std::path::PathBuf;

fn sample() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../calendars/freeze-calendar.yaml")
}

#[test]
fn test_sample_calendar_is_valid() {
    let calendar = load_calendar(sample()).unwrap();
    assert_eq!(calendar.len(), 3);

    let names: Vec<_> = calendar.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["Holiday Season", "Quarter Close", "Datacenter Migration"]);

    assert!(calendar.iter().all(|w| w.is_well_formed()));
    assert!(calendar.windows[1].is_global());
    assert_eq!(
        calendar.windows[2].to_string(),
        "Datacenter Migration from 2025-05-10T22:00:00Z to 2025-05-11T06:00:00Z; scope: eu-de"
    );
}
