//! Session construction and lifetime.
//!
//! A [`Session`] is one authenticated connection to an access point. The
//! builder wires in the collaborators that live outside this crate (stream
//! cipher, mercury client, resolver), then one of the four login entry
//! points drives the whole bootstrap: dial, key exchange, credential
//! exchange, one synchronous post-login poll, and finally the background
//! dispatch task. Once dispatch runs, transport errors tear the session
//! down; before that, every error surfaces to the login caller.

use crate::config::SessionConfig;
use crate::core::plain::PlainTransport;
use crate::core::stream::{PacketReceiver, PacketSender, SharedSender};
use crate::error::{Result, SessionError};
use crate::protocol::dispatcher::Dispatcher;
use crate::protocol::handshake;
use crate::protocol::login::{self, Credentials};
use crate::service::mercury::{Mercury, MercuryFactory, NullMercury};
use crate::transport::{
    self, ApResolver, BoxedConnection, Connection, SessionWriter, StaticApResolver,
};
use crate::utils;
use crate::utils::crypto::{CipherFactory, PrivateKeys};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// An authenticated, encrypted session with an access point.
pub struct Session {
    device_id: String,
    device_name: String,
    username: String,
    reusable_credentials: Vec<u8>,
    reusable_credentials_type: i32,
    country: Arc<RwLock<Option<String>>>,
    sender: SharedSender<SessionWriter>,
    dispatch: JoinHandle<()>,
    closed: watch::Receiver<bool>,
}

impl Session {
    /// Start configuring a session.
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder {
            config,
            cipher: None,
            resolver: None,
            mercury: None,
            transport: None,
        }
    }

    /// Canonical username of the authenticated account.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Device identifier sent during authentication.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Device name sent during authentication.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Reusable credential blob for later stored-credential logins.
    pub fn reusable_credentials(&self) -> &[u8] {
        &self.reusable_credentials
    }

    /// Wire value of the reusable credential type.
    pub fn reusable_credentials_type(&self) -> i32 {
        self.reusable_credentials_type
    }

    /// Country code of the account, once the server has announced it.
    pub fn country(&self) -> Option<String> {
        self.country.read().ok().and_then(|slot| slot.clone())
    }

    /// Clone of the shared send handle, for subsystem clients.
    pub fn sender(&self) -> SharedSender<SessionWriter> {
        self.sender.clone()
    }

    /// Encrypt and send one packet on this session.
    pub async fn send(&self, cmd: u8, payload: &[u8]) -> Result<()> {
        self.sender.send(cmd, payload).await
    }

    /// Wait until the background dispatch task has terminated.
    pub async fn closed(&self) {
        let mut closed = self.closed.clone();
        while !*closed.borrow() {
            if closed.changed().await.is_err() {
                break;
            }
        }
    }

    /// Stop the background dispatch task.
    ///
    /// The transport closes when the session is dropped.
    pub fn shutdown(&self) {
        self.dispatch.abort();
    }
}

/// Configures the collaborators and drives one login.
pub struct SessionBuilder {
    config: SessionConfig,
    cipher: Option<Box<dyn CipherFactory>>,
    resolver: Option<Box<dyn ApResolver>>,
    mercury: Option<MercuryFactory>,
    transport: Option<BoxedConnection>,
}

impl SessionBuilder {
    /// Inject the stream-cipher factory seeded by the handshake keys.
    ///
    /// Required: the cipher implementation lives outside this crate.
    pub fn cipher(mut self, factory: impl CipherFactory + 'static) -> Self {
        self.cipher = Some(Box::new(factory));
        self
    }

    /// Override the access-point resolver.
    pub fn resolver(mut self, resolver: impl ApResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Inject the mercury client factory.
    pub fn mercury<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(SharedSender<SessionWriter>) -> Box<dyn Mercury> + Send + 'static,
    {
        self.mercury = Some(Box::new(factory));
        self
    }

    /// Use an already-established connection instead of resolving and
    /// dialing. Lets tests run against in-memory transports and hosts
    /// tunnel through their own proxies.
    pub fn transport(mut self, connection: impl Connection + 'static) -> Self {
        self.transport = Some(Box::new(connection));
        self
    }

    /// Log in with username and password.
    pub async fn login_password(
        self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Session> {
        let credentials = Credentials::with_password(username, password);
        self.login(credentials, None).await
    }

    /// Log in with a reusable credential blob from an earlier session.
    pub async fn login_stored_credentials(
        self,
        username: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Session> {
        let credentials = Credentials::with_stored_credentials(username, data);
        self.login(credentials, None).await
    }

    /// Log in with an OAuth access token.
    pub async fn login_token(self, access_token: impl Into<String>) -> Result<Session> {
        let credentials = Credentials::with_access_token(access_token);
        self.login(credentials, None).await
    }

    /// Log in with a base64 credential blob from device discovery.
    pub async fn login_discovery_blob(self, username: &str, blob: &str) -> Result<Session> {
        let credentials = Credentials::from_blob(username, blob)?;
        let fallback = credentials.username.clone();
        self.login(credentials, Some(fallback)).await
    }

    #[instrument(level = "debug", skip_all, fields(device = %self.config.device.name))]
    async fn login(self, credentials: Credentials, blob_username: Option<String>) -> Result<Session> {
        self.config.validate_strict()?;
        let cipher = self
            .cipher
            .ok_or_else(|| SessionError::Config("cipher factory is required".into()))?;

        let device_name = self.config.device.name.clone();
        let device_id = self
            .config
            .device
            .id
            .clone()
            .unwrap_or_else(|| utils::device_id(&device_name));

        let connection: BoxedConnection = match self.transport {
            Some(connection) => connection,
            None => {
                let resolver = self
                    .resolver
                    .unwrap_or_else(|| Box::new(StaticApResolver::new(&self.config.ap.address)));
                let address = resolver.resolve().await?;
                Box::new(transport::connect(&address, self.config.ap.connect_timeout).await?)
            }
        };

        // Key exchange runs alone on the plaintext framer; nothing else may
        // touch the transport until the cipher pair takes over.
        let keys = PrivateKeys::generate();
        let mut plain = PlainTransport::new(connection);
        let shared = handshake::perform(&mut plain, &keys).await?;

        let (send_cipher, recv_cipher) = cipher.build(&shared);
        let (read_half, write_half) = tokio::io::split(plain.into_inner());
        let sender = SharedSender::new(PacketSender::new(write_half, send_cipher));
        let mut receiver = PacketReceiver::new(read_half, recv_cipher);

        let mercury_factory = self
            .mercury
            .unwrap_or_else(|| Box::new(|_| Box::new(NullMercury) as Box<dyn Mercury>));
        let mercury = mercury_factory(sender.clone());

        let outcome = login::authenticate(
            &sender,
            &mut receiver,
            &credentials,
            &device_id,
            blob_username.as_deref(),
        )
        .await?;

        let country = Arc::new(RwLock::new(None));
        let (closed_tx, closed_rx) = watch::channel(false);
        let mut dispatcher = Dispatcher::new(
            receiver,
            sender.clone(),
            mercury,
            Arc::clone(&country),
            closed_tx,
        );

        // One synchronous poll primes the stream before background dispatch
        // takes over the receive side.
        dispatcher.handle_one().await?;
        debug!("starting background dispatch");
        let dispatch = tokio::spawn(dispatcher.run());

        Ok(Session {
            device_id,
            device_name,
            username: outcome.username,
            reusable_credentials: outcome.reusable_credentials,
            reusable_credentials_type: outcome.reusable_credentials_type,
            country,
            sender,
            dispatch,
            closed: closed_rx,
        })
    }
}
