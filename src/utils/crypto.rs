//! # Session Key Material
//!
//! Diffie-Hellman key agreement and the per-session key schedule.
//!
//! The key exchange runs over a fixed 768-bit MODP group. The shared secret
//! never keys the stream cipher directly: a transcript-binding KDF mixes it
//! with the exact bytes of the two hello frames, so a transcript tampered
//! with in flight produces a challenge MAC the server will reject.
//!
//! The stream cipher itself is not implemented here. [`PacketCipher`] is the
//! seam the real cipher plugs into; [`PlainCipher`] is the identity variant
//! used by tests and offline tooling.

use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

type HmacSha1 = Hmac<sha1::Sha1>;

/// Generator of the Diffie-Hellman group.
pub const DH_GENERATOR: u8 = 2;

/// The 768-bit MODP prime the access point expects (big-endian).
pub const DH_PRIME: [u8; 96] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xc9, 0x0f, 0xda, 0xa2, 0x21, 0x68, 0xc2,
    0x34, 0xc4, 0xc6, 0x62, 0x8b, 0x80, 0xdc, 0x1c, 0xd1, 0x29, 0x02, 0x4e, 0x08, 0x8a, 0x67,
    0xcc, 0x74, 0x02, 0x0b, 0xbe, 0xa6, 0x3b, 0x13, 0x9b, 0x22, 0x51, 0x4a, 0x08, 0x79, 0x8e,
    0x34, 0x04, 0xdd, 0xef, 0x95, 0x19, 0xb3, 0xcd, 0x3a, 0x43, 0x1b, 0x30, 0x2b, 0x0a, 0x6d,
    0xf2, 0x5f, 0x14, 0x37, 0x4f, 0xe1, 0x35, 0x6d, 0x6d, 0x51, 0xc2, 0x45, 0xe4, 0x85, 0xb5,
    0x76, 0x62, 0x5e, 0x7e, 0xc6, 0xf4, 0x4c, 0x42, 0xe9, 0xa6, 0x3a, 0x36, 0x20, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Client-side ephemeral key material for one session.
///
/// The private scalar never leaves this object; it is consumed by
/// [`PrivateKeys::add_remote_key`] when the server's public element arrives.
pub struct PrivateKeys {
    secret: BigUint,
    public: BigUint,
    client_nonce: [u8; 16],
}

impl PrivateKeys {
    /// Generate a fresh key pair and client nonce from the OS RNG.
    pub fn generate() -> Self {
        let mut scalar = [0u8; 95];
        OsRng.fill_bytes(&mut scalar);
        let mut nonce = [0u8; 16];
        OsRng.fill_bytes(&mut nonce);
        let keys = Self::from_parts(&scalar, nonce);
        scalar.zeroize();
        keys
    }

    /// Build a key pair from an explicit scalar and nonce.
    ///
    /// Exposed so deterministic handshake tests and in-test servers can run
    /// the same arithmetic as the client.
    pub fn from_parts(scalar: &[u8], client_nonce: [u8; 16]) -> Self {
        let prime = BigUint::from_bytes_be(&DH_PRIME);
        let generator = BigUint::from(DH_GENERATOR);
        let secret = BigUint::from_bytes_be(scalar);
        let public = generator.modpow(&secret, &prime);
        Self {
            secret,
            public,
            client_nonce,
        }
    }

    /// The public element `g^c mod p`, big-endian without padding.
    pub fn public_bytes(&self) -> Vec<u8> {
        self.public.to_bytes_be()
    }

    /// The 16-byte nonce mixed into the client hello.
    pub fn client_nonce(&self) -> &[u8; 16] {
        &self.client_nonce
    }

    /// Combine with the server's public element and the captured hello
    /// transcript to derive the session keys.
    pub fn add_remote_key(
        &self,
        remote: &[u8],
        client_packet: &[u8],
        server_packet: &[u8],
    ) -> SharedKeys {
        let prime = BigUint::from_bytes_be(&DH_PRIME);
        let shared = BigUint::from_bytes_be(remote).modpow(&self.secret, &prime);
        SharedKeys::derive(&shared.to_bytes_be(), client_packet, server_packet)
    }
}

/// Symmetric key schedule derived from one completed key exchange.
///
/// Immutable once constructed; consumed to seed the packet cipher pair.
/// Key material is zeroed when the value is dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SharedKeys {
    challenge: [u8; 20],
    send_key: [u8; 32],
    recv_key: [u8; 32],
}

impl SharedKeys {
    /// Derive the key schedule from a shared secret and the exact hello
    /// transcript.
    ///
    /// `client_packet` and `server_packet` must be the verbatim bytes that
    /// crossed the wire, length prefixes and magic included. Five chained
    /// HMAC-SHA1 blocks expand the secret; the first block keys the
    /// challenge MAC, the rest become the directional cipher keys.
    pub fn derive(shared_secret: &[u8], client_packet: &[u8], server_packet: &[u8]) -> Self {
        let mut data = Vec::with_capacity(5 * 20);
        for i in 1..=5u8 {
            let mut mac = HmacSha1::new_from_slice(shared_secret)
                .expect("HMAC accepts keys of any length");
            mac.update(client_packet);
            mac.update(server_packet);
            mac.update(&[i]);
            data.extend_from_slice(&mac.finalize().into_bytes());
        }

        let mut mac =
            HmacSha1::new_from_slice(&data[..20]).expect("HMAC accepts keys of any length");
        mac.update(client_packet);
        mac.update(server_packet);

        let mut challenge = [0u8; 20];
        challenge.copy_from_slice(&mac.finalize().into_bytes());
        let mut send_key = [0u8; 32];
        send_key.copy_from_slice(&data[20..52]);
        let mut recv_key = [0u8; 32];
        recv_key.copy_from_slice(&data[52..84]);
        data.zeroize();

        Self {
            challenge,
            send_key,
            recv_key,
        }
    }

    /// The HMAC proving possession of the shared key; sent back in the
    /// plaintext client response.
    pub fn challenge(&self) -> &[u8; 20] {
        &self.challenge
    }

    /// Key for the client-to-server cipher direction.
    pub fn send_key(&self) -> &[u8; 32] {
        &self.send_key
    }

    /// Key for the server-to-client cipher direction.
    pub fn recv_key(&self) -> &[u8; 32] {
        &self.recv_key
    }
}

/// One direction of the per-packet stream cipher.
///
/// State strictly advances: `encrypt`/`decrypt` transform bytes of the
/// current frame in place, and `finish` emits the frame MAC while stepping
/// the cipher to the next per-packet state. Implementations must tolerate
/// multiple `encrypt`/`decrypt` calls per frame (header first, then
/// payload).
pub trait PacketCipher: Send {
    /// Length in bytes of the MAC this cipher appends to every frame.
    fn mac_len(&self) -> usize;

    /// Encrypt a slice of the current frame in place.
    fn encrypt(&mut self, data: &mut [u8]);

    /// Decrypt a slice of the current frame in place.
    fn decrypt(&mut self, data: &mut [u8]);

    /// Produce the MAC for the current frame and advance to the next one.
    fn finish(&mut self) -> Vec<u8>;
}

/// Seeds a send/receive cipher pair from the derived session keys.
///
/// Injected at session construction so the real stream cipher stays outside
/// this crate and tests can substitute [`PlainCipherFactory`].
pub trait CipherFactory: Send + Sync {
    /// Build the (send, receive) cipher pair for one session.
    fn build(&self, keys: &SharedKeys) -> (Box<dyn PacketCipher>, Box<dyn PacketCipher>);
}

/// Identity cipher: no transformation, zero-length MAC.
///
/// Useful for protocol tests and offline tooling that needs the framing
/// without the encryption.
#[derive(Debug, Default)]
pub struct PlainCipher;

impl PacketCipher for PlainCipher {
    fn mac_len(&self) -> usize {
        0
    }

    fn encrypt(&mut self, _data: &mut [u8]) {}

    fn decrypt(&mut self, _data: &mut [u8]) {}

    fn finish(&mut self) -> Vec<u8> {
        Vec::new()
    }
}

/// Factory producing [`PlainCipher`] pairs.
#[derive(Debug, Default)]
pub struct PlainCipherFactory;

impl CipherFactory for PlainCipherFactory {
    fn build(&self, _keys: &SharedKeys) -> (Box<dyn PacketCipher>, Box<dyn PacketCipher>) {
        (Box::new(PlainCipher), Box::new(PlainCipher))
    }
}
