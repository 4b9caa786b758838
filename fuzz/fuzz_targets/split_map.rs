#![no_main]

use libfuzzer_sys::fuzz_target;
use splitrel::splitmap::{SplitMap, parse_split_map};
use splitrel_types::Project;

fuzz_target!(|data: &[u8]| {
    let Ok(document) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(SplitMap::Entries(entries)) = parse_split_map(document) {
        for entry in entries {
            let _ = Project::from_target(&entry.target);
        }
    }
});
