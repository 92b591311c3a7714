//! Resolution of the object storage connection for one invocation.

use cosproxy_core::{Endpoint, ProxyConfig};
use tracing::debug;

use crate::args::{ActionArgs, HmacKeys};
use crate::error::ActionError;

/// Where the credentials of a connection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Passed explicitly as invocation arguments.
    Arguments,
    /// Taken from the service instance bound to the action.
    BoundService,
    /// Taken from the process configuration.
    Environment,
}

impl CredentialSource {
    /// A short name for logging.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arguments => "arguments",
            Self::BoundService => "bound-service",
            Self::Environment => "environment",
        }
    }
}

/// Everything needed to build an object store client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Endpoint URL.
    pub endpoint: Endpoint,
    /// Signing region.
    pub region: String,
    /// Signing credentials.
    pub keys: HmacKeys,
    /// Where [`keys`](Self::keys) came from.
    pub source: CredentialSource,
    /// Service instance id, when known.
    pub service_instance_id: Option<String>,
}

impl ConnectionParams {
    /// Resolve connection parameters from invocation arguments and configuration.
    ///
    /// Credentials are looked up in order: explicit arguments, the bound
    /// service instance, then the process configuration. Returns `Ok(None)`
    /// when no credentials are available anywhere.
    ///
    /// # Errors
    /// Returns an error if the endpoint is empty.
    pub fn resolve(args: &ActionArgs, config: &ProxyConfig) -> Result<Option<Self>, ActionError> {
        let Some((keys, source)) = resolve_keys(args, config) else {
            debug!("no object storage credentials available");
            return Ok(None);
        };

        let endpoint = Endpoint::parse(args.endpoint.as_deref().unwrap_or(&config.cos_endpoint))?;
        let region = args
            .region
            .clone()
            .unwrap_or_else(|| config.cos_region.clone());
        let service_instance_id = args
            .resource_instance_id
            .clone()
            .or_else(|| args.cos_binding().and_then(|b| b.resource_instance_id.clone()));

        debug!(
            %endpoint,
            region = %region,
            credentials = source.as_str(),
            "resolved object storage connection"
        );

        Ok(Some(Self {
            endpoint,
            region,
            keys,
            source,
            service_instance_id,
        }))
    }
}

fn resolve_keys(args: &ActionArgs, config: &ProxyConfig) -> Option<(HmacKeys, CredentialSource)> {
    if let (Some(access), Some(secret)) = (&args.access_key_id, &args.secret_access_key) {
        if !access.is_empty() && !secret.is_empty() {
            let keys = HmacKeys {
                access_key_id: access.clone(),
                secret_access_key: secret.clone(),
            };
            return Some((keys, CredentialSource::Arguments));
        }
    }

    if let Some(keys) = args.cos_binding().and_then(|b| b.cos_hmac_keys.clone()) {
        return Some((keys, CredentialSource::BoundService));
    }

    config.hmac_keys().map(|(access, secret)| {
        let keys = HmacKeys {
            access_key_id: access.to_owned(),
            secret_access_key: secret.to_owned(),
        };
        (keys, CredentialSource::Environment)
    })
}
