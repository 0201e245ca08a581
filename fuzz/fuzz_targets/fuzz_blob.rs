#![no_main]

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the discovery blob parser over the decoded envelope.
    let blob = BASE64_STANDARD.encode(data);
    if let Ok(credentials) = ap_session::utils::blob::decode_blob("fuzz", &blob) {
        // If decoding succeeds, the envelope must round-trip.
        let reencoded = ap_session::utils::blob::encode_blob(&credentials);
        let decoded = ap_session::utils::blob::decode_blob("fuzz", &reencoded).unwrap();
        assert_eq!(decoded, credentials);
    }

    // The raw primitives must never panic on arbitrary input.
    let _ = ap_session::utils::blob::read_varint(&mut &data[..]);
    let _ = ap_session::utils::blob::read_block(&mut &data[..]);
});
