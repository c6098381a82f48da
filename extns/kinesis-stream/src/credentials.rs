//! Ordered credential sources for the Kinesis client.
//!
//! Static keys, when configured, are tried first. The instance role provider is always last so a
//! role attached to the host can take over without a restart. Each source becomes a provider in an
//! [CredentialsProviderChain]; the SDK walks the chain on demand and the first provider that yields
//! credentials wins.
use std::fmt;
use std::time::Duration;

use aws_config::imds;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;

use crate::{Error, Result};

/// Connect and read timeout for the instance metadata service.
pub const INSTANCE_ROLE_TIMEOUT: Duration = Duration::from_secs(10);

const STATIC_PROVIDER_NAME: &str = "StaticCredentials";
const INSTANCE_ROLE_PROVIDER_NAME: &str = "InstanceRole";

/// Access key pair (and optional session token) supplied through configuration.
#[derive(Clone, PartialEq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl StaticCredentials {
    /// Returns static credentials only when both the key id and the secret are present and
    /// non-empty. An empty token is treated as no token.
    pub fn from_parts(
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        session_token: Option<String>,
    ) -> Option<Self> {
        let access_key_id = access_key_id.filter(|k| !k.is_empty())?;
        let secret_access_key = secret_access_key.filter(|s| !s.is_empty())?;
        Some(Self {
            access_key_id,
            secret_access_key,
            session_token: session_token.filter(|t| !t.is_empty()),
        })
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// One entry of the credential chain.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    /// Always available, never refreshed.
    Static(StaticCredentials),
    /// Discovered from the instance metadata service of the local compute environment.
    InstanceRole { timeout: Duration },
}

impl CredentialSource {
    pub fn name(&self) -> &'static str {
        match self {
            CredentialSource::Static(_) => STATIC_PROVIDER_NAME,
            CredentialSource::InstanceRole { .. } => INSTANCE_ROLE_PROVIDER_NAME,
        }
    }

    fn into_provider(self) -> SharedCredentialsProvider {
        match self {
            CredentialSource::Static(creds) => SharedCredentialsProvider::new(Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                creds.session_token,
                None,
                STATIC_PROVIDER_NAME,
            )),
            CredentialSource::InstanceRole { timeout } => {
                let imds_client = imds::client::Client::builder()
                    .connect_timeout(timeout)
                    .read_timeout(timeout)
                    .build();
                SharedCredentialsProvider::new(
                    ImdsCredentialsProvider::builder()
                        .imds_client(imds_client)
                        .build(),
                )
            }
        }
    }
}

/// Lists the credential sources in the order they should be tried.
pub fn credential_sources(static_credentials: Option<&StaticCredentials>) -> Vec<CredentialSource> {
    let mut sources = Vec::with_capacity(2);
    if let Some(creds) = static_credentials {
        sources.push(CredentialSource::Static(creds.clone()));
    }
    sources.push(CredentialSource::InstanceRole {
        timeout: INSTANCE_ROLE_TIMEOUT,
    });
    sources
}

/// Builds a provider chain from the sources, preserving their order.
pub fn provider_chain(sources: Vec<CredentialSource>) -> Result<CredentialsProviderChain> {
    let mut providers = sources
        .into_iter()
        .map(|source| (source.name(), source.into_provider()));

    let (name, provider) = providers.next().ok_or_else(|| {
        Error::InvalidConfig("at least one credential source is required".to_string())
    })?;

    tracing::debug!(first = name, "Building credential provider chain");

    Ok(providers.fold(
        CredentialsProviderChain::first_try(name, provider),
        |chain, (name, provider)| chain.or_else(name, provider),
    ))
}
