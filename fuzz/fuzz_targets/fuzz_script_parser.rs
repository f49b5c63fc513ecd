#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use melonfx::config::SimulationConfig;
use melonfx::host::RecordingHost;
use melonfx::script::{Script, parse_pulse_line, replay};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for line in text.lines() {
        let _ = parse_pulse_line(line);
    }

    // Only replay what parses; waits can be arbitrarily long but the
    // virtual clock never sleeps.
    if let Ok(script) = Script::parse(text, Path::new("fuzz.yaml")) {
        let simulation = SimulationConfig {
            auto_confirm: true,
            ..SimulationConfig::default()
        };
        let _ = replay(&script, &simulation, RecordingHost::new());
    }
});
