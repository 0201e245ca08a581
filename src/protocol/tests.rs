// test-only module included via protocol/mod.rs
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::config::{CLIENT_BUILD_VERSION, CLIENT_VERSION_STRING, SYSTEM_INFORMATION_STRING};
use crate::core::packet::cmd;
use crate::core::stream::{PacketReceiver, PacketSender, SharedSender};
use crate::error::{Result, SessionError};
use crate::protocol::dispatcher::Dispatcher;
use crate::protocol::handshake;
use crate::protocol::login::{self, Credentials};
use crate::protocol::message::*;
use crate::service::mercury::Mercury;
use crate::utils::blob::{encode_blob, BlobCredentials};
use crate::utils::crypto::{PlainCipher, PrivateKeys, SharedKeys};
use bytes::Bytes;
use prost::Message as _;
use std::sync::{Arc, Mutex, RwLock};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::watch;

use crate::core::plain::PlainTransport;

// ─── handshake ───────────────────────────────────────────────────────────────

/// Server side of the hello exchange, speaking the raw wire format so the
/// client's transcript capture is tested against independent framing.
async fn serve_hello_exchange(
    mut io: DuplexStream,
    server_keys: PrivateKeys,
) -> (SharedKeys, ClientHello, Vec<u8>) {
    // Client hello: 2-byte prefix, 4-byte length, protobuf payload.
    let mut prefix = [0u8; 2];
    io.read_exact(&mut prefix).await.unwrap();
    assert_eq!(prefix, [0x00, 0x04]);
    let mut len = [0u8; 4];
    io.read_exact(&mut len).await.unwrap();
    let total = u32::from_be_bytes(len) as usize;
    let mut payload = vec![0u8; total - 6];
    io.read_exact(&mut payload).await.unwrap();
    let hello = ClientHello::decode(&payload[..]).unwrap();

    let mut client_packet = prefix.to_vec();
    client_packet.extend_from_slice(&len);
    client_packet.extend_from_slice(&payload);

    // Server hello with our public element.
    let response = ApResponseMessage {
        challenge: Some(ApChallenge {
            login_crypto_challenge: LoginCryptoChallengeUnion {
                diffie_hellman: Some(LoginCryptoDiffieHellmanChallenge {
                    gs: server_keys.public_bytes(),
                }),
            },
        }),
    };
    let body = response.encode_to_vec();
    let mut server_packet = ((body.len() + 4) as u32).to_be_bytes().to_vec();
    server_packet.extend_from_slice(&body);
    io.write_all(&server_packet).await.unwrap();

    // Client response: empty prefix, 4-byte length, protobuf payload.
    let mut len = [0u8; 4];
    io.read_exact(&mut len).await.unwrap();
    let total = u32::from_be_bytes(len) as usize;
    let mut payload = vec![0u8; total - 4];
    io.read_exact(&mut payload).await.unwrap();
    let response = ClientResponsePlaintext::decode(&payload[..]).unwrap();
    let hmac = response.login_crypto_response.diffie_hellman.unwrap().hmac;

    let gc = hello
        .login_crypto_hello
        .diffie_hellman
        .as_ref()
        .unwrap()
        .gc
        .clone();
    let derived = server_keys.add_remote_key(&gc, &client_packet, &server_packet);
    (derived, hello, hmac)
}

#[tokio::test]
async fn handshake_hmac_binds_the_exact_transcript() {
    let (client_io, server_io) = tokio::io::duplex(16 * 1024);
    let client_keys = PrivateKeys::from_parts(&[0xC1; 95], [7u8; 16]);
    let server_keys = PrivateKeys::from_parts(&[0x53; 95], [9u8; 16]);

    let server = tokio::spawn(serve_hello_exchange(server_io, server_keys));

    let mut plain = PlainTransport::new(client_io);
    let shared = handshake::perform(&mut plain, &client_keys).await.unwrap();

    let (server_shared, hello, hmac) = server.await.unwrap();

    // Both sides agree, and the proof sent on the wire is the challenge
    // derived from the captured transcript.
    assert_eq!(shared.challenge(), server_shared.challenge());
    assert_eq!(hmac, shared.challenge().to_vec());
    assert_eq!(shared.send_key(), server_shared.send_key());
    assert_eq!(shared.recv_key(), server_shared.recv_key());

    // The hello advertised the fixed build identity.
    assert_eq!(hello.build_info.product, Product::Partner as i32);
    assert_eq!(hello.build_info.platform, Platform::LinuxX86 as i32);
    assert_eq!(hello.build_info.version, CLIENT_BUILD_VERSION);
    assert_eq!(
        hello.cryptosuites_supported,
        vec![Cryptosuite::Shannon as i32]
    );
    assert_eq!(hello.client_nonce, vec![7u8; 16]);
    assert_eq!(
        hello
            .login_crypto_hello
            .diffie_hellman
            .unwrap()
            .server_keys_known,
        1
    );
    assert_eq!(hello.feature_set.unwrap().autoupdate2, Some(true));
}

#[tokio::test]
async fn handshake_rejects_a_hello_without_challenge() {
    let (client_io, mut server_io) = tokio::io::duplex(4096);
    let keys = PrivateKeys::from_parts(&[0xC1; 95], [7u8; 16]);

    let server = tokio::spawn(async move {
        let mut header = [0u8; 6];
        server_io.read_exact(&mut header).await.unwrap();
        let total = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;
        let mut rest = vec![0u8; total - 6];
        server_io.read_exact(&mut rest).await.unwrap();

        let body = ApResponseMessage { challenge: None }.encode_to_vec();
        let mut frame = ((body.len() + 4) as u32).to_be_bytes().to_vec();
        frame.extend_from_slice(&body);
        server_io.write_all(&frame).await.unwrap();
        server_io
    });

    let mut plain = PlainTransport::new(client_io);
    let result = handshake::perform(&mut plain, &keys).await;
    assert!(matches!(result, Err(SessionError::Handshake(_))));
    drop(server.await.unwrap());
}

// ─── login packet construction ───────────────────────────────────────────────

fn decode_login_packet(bytes: &[u8]) -> ClientResponseEncrypted {
    ClientResponseEncrypted::decode(bytes).expect("login packet should decode")
}

#[test]
fn login_packet_carries_the_fixed_system_info() {
    let credentials = Credentials::with_password("alice", "s3cr3t");
    let packet = decode_login_packet(&login::build_login_packet(&credentials, "device-1"));

    assert_eq!(
        packet.system_info.system_information_string.as_deref(),
        Some(SYSTEM_INFORMATION_STRING)
    );
    assert_eq!(packet.system_info.device_id.as_deref(), Some("device-1"));
    assert_eq!(packet.system_info.cpu_family, CpuFamily::CpuUnknown as i32);
    assert_eq!(packet.system_info.os, Os::OsUnknown as i32);
    assert_eq!(packet.version_string.as_deref(), Some(CLIENT_VERSION_STRING));
}

#[test]
fn password_credentials_use_the_user_pass_type() {
    let credentials = Credentials::with_password("alice", "s3cr3t");
    let packet = decode_login_packet(&login::build_login_packet(&credentials, "dev"));

    assert_eq!(packet.login_credentials.username.as_deref(), Some("alice"));
    assert_eq!(
        packet.login_credentials.typ,
        AuthenticationType::AuthenticationUserPass as i32
    );
    assert_eq!(
        packet.login_credentials.auth_data.as_deref(),
        Some(b"s3cr3t".as_slice())
    );
}

#[test]
fn stored_credentials_use_the_stored_type() {
    let credentials = Credentials::with_stored_credentials("alice", vec![9, 9, 9]);
    let packet = decode_login_packet(&login::build_login_packet(&credentials, "dev"));

    assert_eq!(
        packet.login_credentials.typ,
        AuthenticationType::AuthenticationStoredSpotifyCredentials as i32
    );
    assert_eq!(
        packet.login_credentials.auth_data.as_deref(),
        Some([9u8, 9, 9].as_slice())
    );
}

#[test]
fn token_credentials_send_an_empty_username() {
    let credentials = Credentials::with_access_token("token-abc");
    let packet = decode_login_packet(&login::build_login_packet(&credentials, "dev"));

    assert_eq!(packet.login_credentials.username.as_deref(), Some(""));
    assert_eq!(
        packet.login_credentials.typ,
        AuthenticationType::AuthenticationSpotifyToken as i32
    );
    assert_eq!(
        packet.login_credentials.auth_data.as_deref(),
        Some(b"token-abc".as_slice())
    );
}

#[test]
fn blob_credentials_survive_the_envelope() {
    let blob = encode_blob(&BlobCredentials {
        username: "bob".to_string(),
        auth_type: AuthenticationType::AuthenticationStoredSpotifyCredentials as i32,
        auth_data: vec![0x01, 0x02, 0x03],
    });
    let credentials = Credentials::from_blob("bob", &blob).unwrap();
    let packet = decode_login_packet(&login::build_login_packet(&credentials, "dev"));

    assert_eq!(packet.login_credentials.username.as_deref(), Some("bob"));
    assert_eq!(
        packet.login_credentials.typ,
        AuthenticationType::AuthenticationStoredSpotifyCredentials as i32
    );
    assert_eq!(
        packet.login_credentials.auth_data.as_deref(),
        Some([0x01u8, 0x02, 0x03].as_slice())
    );
    assert_eq!(packet.version_string.as_deref(), Some(CLIENT_VERSION_STRING));
}

// ─── dispatcher ──────────────────────────────────────────────────────────────

struct RecordingMercury {
    seen: Arc<Mutex<Vec<(u8, Vec<u8>)>>>,
}

impl Mercury for RecordingMercury {
    fn handle(&mut self, cmd: u8, payload: Bytes) -> Result<()> {
        self.seen.lock().unwrap().push((cmd, payload.to_vec()));
        Ok(())
    }
}

struct DispatcherHarness {
    dispatcher: Dispatcher<tokio::io::ReadHalf<DuplexStream>, tokio::io::WriteHalf<DuplexStream>>,
    server_in: tokio::io::WriteHalf<DuplexStream>,
    server_out: tokio::io::ReadHalf<DuplexStream>,
    country: Arc<RwLock<Option<String>>>,
    seen: Arc<Mutex<Vec<(u8, Vec<u8>)>>>,
}

fn dispatcher_harness() -> DispatcherHarness {
    let (client_io, server_io) = tokio::io::duplex(16 * 1024);
    let (client_read, client_write) = tokio::io::split(client_io);
    let (server_out, server_in) = tokio::io::split(server_io);

    let sender = SharedSender::new(PacketSender::new(client_write, Box::new(PlainCipher)));
    let receiver = PacketReceiver::new(client_read, Box::new(PlainCipher));
    let country = Arc::new(RwLock::new(None));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (closed_tx, _closed_rx) = watch::channel(false);

    let dispatcher = Dispatcher::new(
        receiver,
        sender,
        Box::new(RecordingMercury { seen: seen.clone() }),
        country.clone(),
        closed_tx,
    );

    DispatcherHarness {
        dispatcher,
        server_in,
        server_out,
        country,
        seen,
    }
}

async fn write_frame(io: &mut (impl AsyncWriteExt + Unpin), cmd: u8, payload: &[u8]) {
    let mut frame = vec![cmd];
    frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    frame.extend_from_slice(payload);
    io.write_all(&frame).await.unwrap();
}

async fn read_frame(io: &mut (impl AsyncReadExt + Unpin)) -> (u8, Vec<u8>) {
    let mut header = [0u8; 3];
    io.read_exact(&mut header).await.unwrap();
    let len = u16::from_be_bytes([header[1], header[2]]) as usize;
    let mut payload = vec![0u8; len];
    io.read_exact(&mut payload).await.unwrap();
    (header[0], payload)
}

#[tokio::test]
async fn ping_is_echoed_as_pong_with_the_same_payload() {
    let mut harness = dispatcher_harness();

    write_frame(&mut harness.server_in, cmd::PING, &[0xDE, 0xAD, 0xBE, 0xEF]).await;
    harness.dispatcher.handle_one().await.unwrap();

    let (reply_cmd, reply_payload) = read_frame(&mut harness.server_out).await;
    assert_eq!(reply_cmd, cmd::PONG);
    assert_eq!(reply_payload, vec![0xDE, 0xAD, 0xBE, 0xEF]);
}

#[tokio::test]
async fn country_code_is_recorded() {
    let mut harness = dispatcher_harness();

    write_frame(&mut harness.server_in, cmd::COUNTRY_CODE, b"US").await;
    harness.dispatcher.handle_one().await.unwrap();

    assert_eq!(harness.country.read().unwrap().as_deref(), Some("US"));
}

#[tokio::test]
async fn mercury_frames_reach_the_mercury_client_once() {
    let mut harness = dispatcher_harness();

    write_frame(&mut harness.server_in, 0xb2, &[0x10, 0x20]).await;
    harness.dispatcher.handle_one().await.unwrap();

    let seen = harness.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[(0xb2u8, vec![0x10, 0x20])]);
}

#[tokio::test]
async fn unknown_commands_are_ignored() {
    let mut harness = dispatcher_harness();

    write_frame(&mut harness.server_in, 0x42, &[0xFF]).await;
    harness.dispatcher.handle_one().await.unwrap();

    assert!(harness.seen.lock().unwrap().is_empty());
    assert!(harness.country.read().unwrap().is_none());
}

#[tokio::test]
async fn dispatch_preserves_receive_order() {
    let mut harness = dispatcher_harness();

    for i in 0..5u8 {
        write_frame(&mut harness.server_in, 0xb2, &[i]).await;
    }
    for _ in 0..5 {
        harness.dispatcher.handle_one().await.unwrap();
    }

    let seen = harness.seen.lock().unwrap();
    let order: Vec<u8> = seen.iter().map(|(_, p)| p[0]).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
}
