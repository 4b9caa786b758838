#![no_main]

use std::fs;

use libfuzzer_sys::fuzz_target;
use splitrel_config::load_config_from_file;
use tempfile::tempdir;

fuzz_target!(|data: &[u8]| {
    let td = match tempdir() {
        Ok(v) => v,
        Err(_) => return,
    };

    let path = td.path().join(".splitrel.toml");
    if fs::write(&path, data).is_err() {
        return;
    }

    if let Ok(config) = load_config_from_file(&path) {
        let _ = config.select_sources(None);
        let _ = config.tag_project();
    }
});
