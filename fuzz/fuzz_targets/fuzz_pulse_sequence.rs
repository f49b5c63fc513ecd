#![no_main]

use libfuzzer_sys::fuzz_target;
use melonfx::host::{RecordingHost, Session};
use melonfx::pulse::{PulseKind, Trigger};

fuzz_target!(|data: &[u8]| {
    let mut session = Session::new(RecordingHost::new());
    let mut last_phase = session.phase();

    for byte in data {
        let kind = PulseKind::ALL[usize::from(*byte) % PulseKind::ALL.len()];
        session.fire(kind);

        assert!(session.phase() >= last_phase, "phase moved backward");
        last_phase = session.phase();
    }

    for trigger in Trigger::ALL {
        assert!(session.host().count(trigger) <= 1, "{trigger} emitted twice");
    }
});
