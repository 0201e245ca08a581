//! Key-exchange handshake with the access point.
//!
//! Three messages over the plaintext framer: client hello, server hello,
//! client response. The derived keys are bound to the exact bytes of the
//! two hello frames, so both frames are captured verbatim as they cross the
//! wire and fed into the KDF together with the Diffie-Hellman secret. The
//! proof returned to the server is the transcript HMAC; getting a single
//! byte of the capture wrong produces a challenge the server rejects.

use crate::config::CLIENT_BUILD_VERSION;
use crate::core::plain::PlainTransport;
use crate::error::constants::{ERR_MISSING_CHALLENGE, ERR_MISSING_DH_CHALLENGE};
use crate::error::{Result, SessionError};
use crate::protocol::message::{
    ApResponseMessage, BuildInfo, ClientHello, ClientResponsePlaintext, CryptoResponseUnion,
    Cryptosuite, FeatureSet, LoginCryptoDiffieHellmanHello, LoginCryptoDiffieHellmanResponse,
    LoginCryptoHelloUnion, LoginCryptoResponseUnion, Platform, PowResponseUnion, Product,
};
use crate::utils::crypto::{PrivateKeys, SharedKeys};
use prost::Message;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument};

/// Prefix bytes tagging the client hello frame.
const CLIENT_HELLO_PREFIX: [u8; 2] = [0x00, 0x04];

/// Run the three-message key exchange and derive the session keys.
///
/// On return the plaintext framer has served its purpose; the caller
/// retires it and hands the raw transport to the cipher layer. Every error
/// is fatal to the connection.
#[instrument(level = "debug", skip_all)]
pub async fn perform<T>(conn: &mut PlainTransport<T>, keys: &PrivateKeys) -> Result<SharedKeys>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let hello = build_client_hello(keys);
    let client_packet = conn
        .send_prefix_packet(&CLIENT_HELLO_PREFIX, &hello.encode_to_vec())
        .await?;

    let server_packet = conn.recv_packet().await?;
    let response = ApResponseMessage::decode(&server_packet[4..])?;
    let remote_key = server_key(&response)?;

    let shared = keys.add_remote_key(remote_key, &client_packet, &server_packet);

    let response = ClientResponsePlaintext {
        login_crypto_response: LoginCryptoResponseUnion {
            diffie_hellman: Some(LoginCryptoDiffieHellmanResponse {
                hmac: shared.challenge().to_vec(),
            }),
        },
        pow_response: PowResponseUnion {},
        crypto_response: CryptoResponseUnion {},
    };
    conn.send_prefix_packet(&[], &response.encode_to_vec())
        .await?;

    debug!("key exchange complete");
    Ok(shared)
}

fn build_client_hello(keys: &PrivateKeys) -> ClientHello {
    ClientHello {
        build_info: BuildInfo {
            product: Product::Partner as i32,
            platform: Platform::LinuxX86 as i32,
            version: CLIENT_BUILD_VERSION,
        },
        cryptosuites_supported: vec![Cryptosuite::Shannon as i32],
        login_crypto_hello: LoginCryptoHelloUnion {
            diffie_hellman: Some(LoginCryptoDiffieHellmanHello {
                gc: keys.public_bytes(),
                server_keys_known: 1,
            }),
        },
        client_nonce: keys.client_nonce().to_vec(),
        feature_set: Some(FeatureSet {
            autoupdate2: Some(true),
        }),
    }
}

fn server_key(response: &ApResponseMessage) -> Result<&[u8]> {
    let challenge = response
        .challenge
        .as_ref()
        .ok_or_else(|| SessionError::Handshake(ERR_MISSING_CHALLENGE.into()))?;
    let diffie_hellman = challenge
        .login_crypto_challenge
        .diffie_hellman
        .as_ref()
        .ok_or_else(|| SessionError::Handshake(ERR_MISSING_DH_CHALLENGE.into()))?;
    Ok(&diffie_hellman.gs)
}
