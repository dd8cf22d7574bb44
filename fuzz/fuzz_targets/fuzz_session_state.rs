#![no_main]
use libfuzzer_sys::fuzz_target;
use tlskeys_tls::session::{decode_session_state, encode_session_state};

fuzz_target!(|data: &[u8]| {
    if let Ok(session) = decode_session_state(data) {
        let encoded = encode_session_state(&session).unwrap();
        let again = decode_session_state(&encoded).unwrap();
        assert_eq!(again.master_secret, session.master_secret);
        assert_eq!(again.resume_type, session.resume_type);
    }
});
