#![no_main]

use chrono::{DateTime, Utc};
use libfuzzer_sys::fuzz_target;
use splitrel::list::{Stability, parse_version};
use splitrel_types::Release;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // Every parseable version is either stable or unstable, never both.
    if parse_version(raw).is_some() {
        let release = Release::new(raw, DateTime::<Utc>::UNIX_EPOCH);
        assert_ne!(
            Stability::Stable.shows(Some(&release)),
            Stability::Unstable.shows(Some(&release))
        );
    }
});
