//! tonic implementation of [`ConfigTransport`].

use std::time::Duration;

use futures::StreamExt;
use tonic::async_trait;
use tonic::codec::CompressionEncoding;
use tonic::metadata::AsciiMetadataValue;
use tonic::transport::Certificate;
use tonic::transport::Channel;
use tonic::transport::ClientTlsConfig;
use tonic::transport::Endpoint;
use tonic::Request;
use tracing::debug;
use tracing::info;

use super::ConfigTransport;
use super::TraceResponseStream;
use super::WatchRequestStream;
use super::WatchResponseStream;
use crate::constants::AUTH_TOKEN_METADATA_KEY;
use crate::proto::config_service_client::ConfigServiceClient;
use crate::proto::GetRequest;
use crate::proto::GetResponse;
use crate::proto::TraceRequest;
use crate::proto::UpdateRequest;
use crate::proto::UpdateResponse;
use crate::ClientConfig;
use crate::Error;
use crate::NetworkError;
use crate::Result;
use crate::TlsConfig;

#[derive(Debug, Clone)]
pub struct GrpcTransport {
    // Channel is cheap to clone and multiplexes every call.
    client: ConfigServiceClient<Channel>,
    auth_token: Option<AsciiMetadataValue>,
    request_timeout: Duration,
}

impl GrpcTransport {
    /// Connects eagerly, failing when the server is unreachable
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let endpoint = Self::endpoint(config)?;
        debug!(endpoint = %config.endpoint, "[GrpcTransport] connecting");
        let channel = endpoint.connect().await?;
        info!(endpoint = %config.endpoint, "[GrpcTransport] connected");
        Self::with_channel(channel, config)
    }

    /// Builds the transport without dialing; the connection is established on
    /// first use and re-established by the channel when it drops.
    pub fn connect_lazy(config: &ClientConfig) -> Result<Self> {
        let channel = Self::endpoint(config)?.connect_lazy();
        Self::with_channel(channel, config)
    }

    pub fn with_channel(
        channel: Channel,
        config: &ClientConfig,
    ) -> Result<Self> {
        let mut client = ConfigServiceClient::new(channel);
        if config.enable_compression {
            client = client
                .send_compressed(CompressionEncoding::Gzip)
                .accept_compressed(CompressionEncoding::Gzip);
        }

        let auth_token = config
            .auth_token
            .as_deref()
            .map(|token| {
                AsciiMetadataValue::try_from(token)
                    .map_err(|e| NetworkError::InvalidMetadata(format!("{AUTH_TOKEN_METADATA_KEY}: {e}")))
            })
            .transpose()?;

        Ok(Self {
            client,
            auth_token,
            request_timeout: config.request_timeout(),
        })
    }

    fn endpoint(config: &ClientConfig) -> Result<Endpoint> {
        let mut endpoint = Endpoint::try_from(config.endpoint.clone())
            .map_err(|e| NetworkError::InvalidURI(format!("{}: {e}", config.endpoint)))?
            .connect_timeout(config.connect_timeout())
            .tcp_keepalive(Some(config.tcp_keepalive()))
            .http2_keep_alive_interval(config.http2_keep_alive_interval())
            .keep_alive_timeout(config.http2_keep_alive_timeout())
            .keep_alive_while_idle(true);

        if config.tls.enable_tls {
            endpoint = endpoint.tls_config(Self::tls_config(&config.tls)?)?;
        }
        Ok(endpoint)
    }

    fn tls_config(config: &TlsConfig) -> Result<ClientTlsConfig> {
        let mut tls = ClientTlsConfig::new();
        if let Some(path) = &config.ca_certificate_path {
            let pem = std::fs::read_to_string(path).map_err(|e| NetworkError::TlsSetup(format!("{path}: {e}")))?;
            tls = tls.ca_certificate(Certificate::from_pem(pem));
        }
        if let Some(domain_name) = &config.domain_name {
            tls = tls.domain_name(domain_name.clone());
        }
        Ok(tls)
    }

    /// Wraps a message, attaching the auth token
    pub(crate) fn request<T>(
        &self,
        message: T,
    ) -> Request<T> {
        let mut request = Request::new(message);
        if let Some(token) = &self.auth_token {
            request.metadata_mut().insert(AUTH_TOKEN_METADATA_KEY, token.clone());
        }
        request
    }

    fn unary_request<T>(
        &self,
        message: T,
    ) -> Request<T> {
        let mut request = self.request(message);
        request.set_timeout(self.request_timeout);
        request
    }
}

#[async_trait]
impl ConfigTransport for GrpcTransport {
    async fn get(
        &self,
        request: GetRequest,
    ) -> Result<GetResponse> {
        let mut client = self.client.clone();
        let response = client.get(self.unary_request(request)).await?;
        Ok(response.into_inner())
    }

    async fn update(
        &self,
        request: UpdateRequest,
    ) -> Result<UpdateResponse> {
        let mut client = self.client.clone();
        let response = client.update(self.unary_request(request)).await?;
        Ok(response.into_inner())
    }

    async fn watch(
        &self,
        requests: WatchRequestStream,
    ) -> Result<WatchResponseStream> {
        let mut client = self.client.clone();
        // Boxed as `Send` up front: rustc cannot otherwise prove the
        // client-streaming future `Send` inside the async-trait future.
        let call: futures::future::BoxFuture<'_, std::result::Result<_, tonic::Status>> =
            Box::pin(client.watch(self.request(requests)));
        let response = call.await?;
        Ok(response.into_inner().map(|reply| reply.map_err(Error::from)).boxed())
    }

    async fn trace(
        &self,
        request: TraceRequest,
    ) -> Result<TraceResponseStream> {
        let mut client = self.client.clone();
        let response = client.trace(self.request(request)).await?;
        Ok(response.into_inner().map(|event| event.map_err(Error::from)).boxed())
    }
}
