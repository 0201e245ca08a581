//! Wire messages for the hello exchange and the login exchange.
//!
//! Hand-maintained prost structs; field tags and enum values match the
//! production protocol, so these encode byte-for-byte what the access point
//! expects. Server-sent messages may carry fields beyond the ones modeled
//! here; prost skips unknown fields on decode.

/// Products a client can identify as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Product {
    /// Official desktop client.
    Client = 0,
    /// libspotify-based integration.
    Libspotify = 1,
    /// Mobile client.
    Mobile = 2,
    /// Partner device integration.
    Partner = 3,
    /// Embedded libspotify build.
    LibspotifyEmbedded = 5,
}

/// Platforms a client can identify as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Platform {
    /// 32-bit Windows.
    Win32X86 = 0,
    /// 32-bit macOS.
    OsxX86 = 1,
    /// 32-bit Linux.
    LinuxX86 = 2,
}

/// Stream ciphers the client can negotiate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Cryptosuite {
    /// Shannon stream cipher.
    Shannon = 0,
    /// RC4 with SHA-1 HMAC.
    Rc4Sha1Hmac = 1,
    /// AES-CTR with SHA-1 HMAC.
    AesCtrSha1Hmac = 2,
}

/// Credential flavors accepted by the login exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AuthenticationType {
    /// Plain username and password.
    AuthenticationUserPass = 0,
    /// Reusable credential blob from an earlier login.
    AuthenticationStoredSpotifyCredentials = 1,
    /// Stored third-party credentials.
    AuthenticationStoredFacebookCredentials = 2,
    /// OAuth access token; the username is derived server-side.
    AuthenticationSpotifyToken = 3,
    /// Third-party OAuth token.
    AuthenticationFacebookToken = 4,
}

/// CPU families reported in system info.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CpuFamily {
    /// Unspecified CPU.
    CpuUnknown = 0,
}

/// Operating systems reported in system info.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Os {
    /// Unspecified operating system.
    OsUnknown = 0,
}

/// Build identification sent in the client hello.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuildInfo {
    #[prost(enumeration = "Product", required, tag = "10")]
    pub product: i32,
    #[prost(enumeration = "Platform", required, tag = "30")]
    pub platform: i32,
    #[prost(uint64, required, tag = "40")]
    pub version: u64,
}

/// Client half of the Diffie-Hellman exchange.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginCryptoDiffieHellmanHello {
    #[prost(bytes = "vec", required, tag = "10")]
    pub gc: Vec<u8>,
    #[prost(uint32, required, tag = "20")]
    pub server_keys_known: u32,
}

/// Key-exchange union in the client hello.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginCryptoHelloUnion {
    #[prost(message, optional, tag = "10")]
    pub diffie_hellman: Option<LoginCryptoDiffieHellmanHello>,
}

/// Feature flags advertised by the client.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeatureSet {
    #[prost(bool, optional, tag = "1")]
    pub autoupdate2: Option<bool>,
}

/// First message of the handshake, sent in plaintext.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientHello {
    #[prost(message, required, tag = "10")]
    pub build_info: BuildInfo,
    #[prost(enumeration = "Cryptosuite", repeated, packed = "false", tag = "30")]
    pub cryptosuites_supported: Vec<i32>,
    #[prost(message, required, tag = "50")]
    pub login_crypto_hello: LoginCryptoHelloUnion,
    #[prost(bytes = "vec", required, tag = "60")]
    pub client_nonce: Vec<u8>,
    #[prost(message, optional, tag = "80")]
    pub feature_set: Option<FeatureSet>,
}

/// Server half of the Diffie-Hellman exchange.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginCryptoDiffieHellmanChallenge {
    #[prost(bytes = "vec", required, tag = "10")]
    pub gs: Vec<u8>,
}

/// Key-exchange union in the server challenge.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginCryptoChallengeUnion {
    #[prost(message, optional, tag = "10")]
    pub diffie_hellman: Option<LoginCryptoDiffieHellmanChallenge>,
}

/// Challenge block of the server hello.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApChallenge {
    #[prost(message, required, tag = "10")]
    pub login_crypto_challenge: LoginCryptoChallengeUnion,
}

/// Second message of the handshake, received in plaintext.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApResponseMessage {
    #[prost(message, optional, tag = "10")]
    pub challenge: Option<ApChallenge>,
}

/// Proof of shared-key possession.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginCryptoDiffieHellmanResponse {
    #[prost(bytes = "vec", required, tag = "10")]
    pub hmac: Vec<u8>,
}

/// Key-exchange union in the client response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginCryptoResponseUnion {
    #[prost(message, optional, tag = "10")]
    pub diffie_hellman: Option<LoginCryptoDiffieHellmanResponse>,
}

/// Empty proof-of-work union, sent for wire compatibility.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PowResponseUnion {}

/// Empty crypto-negotiation union, sent for wire compatibility.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoResponseUnion {}

/// Third message of the handshake, sent in plaintext.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientResponsePlaintext {
    #[prost(message, required, tag = "10")]
    pub login_crypto_response: LoginCryptoResponseUnion,
    #[prost(message, required, tag = "20")]
    pub pow_response: PowResponseUnion,
    #[prost(message, required, tag = "30")]
    pub crypto_response: CryptoResponseUnion,
}

/// Credentials inside the encrypted login packet.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginCredentials {
    #[prost(string, optional, tag = "10")]
    pub username: Option<String>,
    #[prost(enumeration = "AuthenticationType", required, tag = "20")]
    pub typ: i32,
    #[prost(bytes = "vec", optional, tag = "30")]
    pub auth_data: Option<Vec<u8>>,
}

/// Device description inside the encrypted login packet.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SystemInfo {
    #[prost(enumeration = "CpuFamily", required, tag = "10")]
    pub cpu_family: i32,
    #[prost(enumeration = "Os", required, tag = "60")]
    pub os: i32,
    #[prost(string, optional, tag = "90")]
    pub system_information_string: Option<String>,
    #[prost(string, optional, tag = "100")]
    pub device_id: Option<String>,
}

/// The encrypted login packet (command `0xAB`).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientResponseEncrypted {
    #[prost(message, required, tag = "10")]
    pub login_credentials: LoginCredentials,
    #[prost(message, required, tag = "50")]
    pub system_info: SystemInfo,
    #[prost(string, optional, tag = "70")]
    pub version_string: Option<String>,
}

/// Successful login reply (command `0xAC`).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApWelcome {
    #[prost(string, required, tag = "10")]
    pub canonical_username: String,
    #[prost(enumeration = "AuthenticationType", optional, tag = "30")]
    pub reusable_auth_credentials_type: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "40")]
    pub reusable_auth_credentials: Option<Vec<u8>>,
}
