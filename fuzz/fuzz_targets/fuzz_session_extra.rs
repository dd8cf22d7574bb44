#![no_main]
use libfuzzer_sys::fuzz_target;
use tlskeys_tls::session::{
    decode_session_extra, encode_session_extra, ExtraDecode, ExtraFields, SessionRecord,
    SessionResumptionData,
};

fuzz_target!(|data: &[u8]| {
    if let ExtraDecode::Recognized(v) = decode_session_extra(data) {
        // Anything we accept must re-encode to something we accept again
        if let Ok(Some(container)) = encode_session_extra(&v) {
            assert_eq!(decode_session_extra(&container), ExtraDecode::Recognized(v));
        }
    }
    let _ = SessionResumptionData::decode(data);
    if let Ok(Some(fields)) = ExtraFields::parse(data) {
        for field in fields {
            if field.is_err() {
                break;
            }
        }
    }

    let mut record = vec![data.to_vec(), b"foreign".to_vec()];
    let _ = record.session_extra();
    record.clear_session_extra();
    assert_eq!(record.last().map(Vec::as_slice), Some(&b"foreign"[..]));
});
