#![no_main]

use libfuzzer_sys::fuzz_target;
use splitrel_types::Project;

fuzz_target!(|data: &[u8]| {
    let Ok(target) = std::str::from_utf8(data) else {
        return;
    };

    // A parsed project always prints back as org/name and reparses.
    if let Ok(project) = Project::from_target(target) {
        let shown = project.to_string();
        assert_eq!(shown.parse::<Project>().ok(), Some(project));
    }
});
