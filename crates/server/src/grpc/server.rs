//! Synthesis gRPC server

use crate::backend::{FakeBackend, TimingModel};
use crate::service::SynthesisService;
use std::future::Future;
use std::net::SocketAddr;
use synthd_common::{Result, ServerConfig, ServiceError};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{info, warn};

/// Synthesis gRPC server
pub struct SynthesisServer<B> {
    config: ServerConfig,
    service: SynthesisService<B>,
}

impl SynthesisServer<FakeBackend> {
    /// Create a server backed by a fixed-frequency fake backend
    pub fn fake(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let backend = FakeBackend::from_config(&config.backend)?;
        Ok(Self::new(config, SynthesisService::new(backend)))
    }
}

impl<B: TimingModel> SynthesisServer<B> {
    /// Create a new server around an existing service
    pub fn new(config: ServerConfig, service: SynthesisService<B>) -> Self {
        Self { config, service }
    }

    /// Bind the configured address. The server accepts connections from the
    /// moment this returns, even before `serve_with_shutdown` runs.
    pub async fn bind(&self) -> Result<TcpListener> {
        let address = self.config.listen_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            ServiceError::config(format!("Failed to bind {}: {}", address, e))
        })?;
        Ok(listener)
    }

    /// Serve on an already bound listener until `shutdown` completes
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let addr: SocketAddr = listener.local_addr()?;
        info!(
            "Synthesis gRPC server listening on {} ({} backend)",
            addr,
            self.service.backend().name()
        );

        Server::builder()
            .add_service(self.service.into_server())
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await?;

        info!("Synthesis gRPC server on {} stopped", addr);
        Ok(())
    }

    /// Bind and serve until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve_with_shutdown(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal");
        })
        .await
    }
}
