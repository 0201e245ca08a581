//! Credential handling and the encrypted login exchange.
//!
//! Every login flavor funnels into one [`ClientResponseEncrypted`] packet
//! sent as command `0xAB`. The reply is exactly one packet: `0xAC` with an
//! [`ApWelcome`] on success, `0xAD` on rejection (recoverable by the
//! caller), anything else is a protocol error.

use crate::config::{CLIENT_VERSION_STRING, SYSTEM_INFORMATION_STRING};
use crate::core::packet::cmd;
use crate::core::stream::{PacketReceiver, SharedSender};
use crate::error::{Result, SessionError};
use crate::protocol::message::{
    ApWelcome, AuthenticationType, ClientResponseEncrypted, CpuFamily, LoginCredentials, Os,
    SystemInfo,
};
use crate::utils::blob::{self, BlobCredentials};
use prost::Message;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, instrument, warn};

/// Credentials for one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name; empty for token logins, where the server derives it.
    pub username: String,
    /// Wire value of the authentication type.
    pub auth_type: i32,
    /// Flavor-specific authentication data.
    pub auth_data: Vec<u8>,
}

impl Credentials {
    /// Password credentials.
    pub fn with_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            auth_type: AuthenticationType::AuthenticationUserPass as i32,
            auth_data: password.into().into_bytes(),
        }
    }

    /// Reusable credentials returned by an earlier login.
    pub fn with_stored_credentials(username: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            username: username.into(),
            auth_type: AuthenticationType::AuthenticationStoredSpotifyCredentials as i32,
            auth_data: data,
        }
    }

    /// OAuth access token. The username is intentionally left empty; the
    /// server resolves it from the token.
    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            username: String::new(),
            auth_type: AuthenticationType::AuthenticationSpotifyToken as i32,
            auth_data: token.into().into_bytes(),
        }
    }

    /// Decode a base64 discovery envelope into credentials.
    pub fn from_blob(username: &str, encoded_blob: &str) -> Result<Self> {
        let BlobCredentials {
            username,
            auth_type,
            auth_data,
        } = blob::decode_blob(username, encoded_blob)?;
        Ok(Self {
            username,
            auth_type,
            auth_data,
        })
    }
}

/// Credentials and account facts recovered from a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Canonical username, or the blob fallback when the server omits it.
    pub username: String,
    /// Reusable credential blob for later stored-credential logins.
    pub reusable_credentials: Vec<u8>,
    /// Wire value of the reusable credential type.
    pub reusable_credentials_type: i32,
}

/// Build the serialized login packet for any credential flavor.
pub fn build_login_packet(credentials: &Credentials, device_id: &str) -> Vec<u8> {
    let packet = ClientResponseEncrypted {
        login_credentials: LoginCredentials {
            username: Some(credentials.username.clone()),
            typ: credentials.auth_type,
            auth_data: Some(credentials.auth_data.clone()),
        },
        system_info: SystemInfo {
            cpu_family: CpuFamily::CpuUnknown as i32,
            os: Os::OsUnknown as i32,
            system_information_string: Some(SYSTEM_INFORMATION_STRING.to_string()),
            device_id: Some(device_id.to_string()),
        },
        version_string: Some(CLIENT_VERSION_STRING.to_string()),
    };
    packet.encode_to_vec()
}

/// Send the login packet and consume the single authentication reply.
///
/// `blob_username` is the discovery blob's account name, set only when the
/// session was started from a blob; it backfills an empty canonical
/// username in the welcome message.
#[instrument(level = "debug", skip_all, fields(username = %credentials.username))]
pub async fn authenticate<W, R>(
    sender: &SharedSender<W>,
    receiver: &mut PacketReceiver<R>,
    credentials: &Credentials,
    device_id: &str,
    blob_username: Option<&str>,
) -> Result<AuthOutcome>
where
    W: AsyncWrite + Unpin + Send,
    R: AsyncRead + Unpin + Send,
{
    let packet = build_login_packet(credentials, device_id);
    sender.send(cmd::LOGIN, &packet).await?;
    debug!(bytes = packet.len(), "login packet sent");

    let reply = receiver.recv().await?;
    match reply.cmd {
        cmd::AP_WELCOME => {
            let welcome = ApWelcome::decode(&reply.payload[..])?;
            let username = if welcome.canonical_username.is_empty() {
                blob_username.unwrap_or_default().to_string()
            } else {
                welcome.canonical_username
            };
            info!(%username, "authenticated");
            Ok(AuthOutcome {
                username,
                reusable_credentials: welcome.reusable_auth_credentials.unwrap_or_default(),
                reusable_credentials_type: welcome.reusable_auth_credentials_type.unwrap_or(
                    AuthenticationType::AuthenticationStoredSpotifyCredentials as i32,
                ),
            })
        }
        cmd::AUTH_FAILURE => {
            warn!("access point rejected the credentials");
            Err(SessionError::AuthFailed)
        }
        other => Err(SessionError::UnexpectedCommand(other)),
    }
}
