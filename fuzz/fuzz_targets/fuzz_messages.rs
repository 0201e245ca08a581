#![no_main]

use ap_session::protocol::message::{ApResponseMessage, ApWelcome, ClientResponseEncrypted};
use libfuzzer_sys::fuzz_target;
use prost::Message;

fuzz_target!(|data: &[u8]| {
    // Server-sent messages are decoded from untrusted bytes.
    let _ = ApResponseMessage::decode(data);
    let _ = ApWelcome::decode(data);

    // The login packet is client-built, but decoding it must still be safe.
    if let Ok(packet) = ClientResponseEncrypted::decode(data) {
        let reencoded = packet.encode_to_vec();
        let _ = ClientResponseEncrypted::decode(&reencoded[..]);
    }
});
