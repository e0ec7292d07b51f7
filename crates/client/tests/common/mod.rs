#![allow(dead_code)]

use std::net::SocketAddr;
use synthd_common::{BackendConfig, ClientConfig, MetricsRegistry, ServerConfig};
use synthd_server::{FakeBackend, SynthesisServer, SynthesisService, TimingModel};
use tokio::runtime::Runtime;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const VERILOG: &str = r#"
module main(
  input wire [31:0] x,
  input wire [31:0] y,
  output wire [31:0] out
);
  assign out = x + y;
endmodule
"#;

/// Fake synthesis server running on the current tokio runtime
pub struct RunningServer {
    pub addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<synthd_common::Result<()>>,
}

pub async fn spawn_server(max_frequency_ghz: f64, serve_errors: bool) -> RunningServer {
    let backend = FakeBackend::from_config(&BackendConfig {
        max_frequency_hz: max_frequency_ghz * 1e9,
        serve_errors,
    })
    .expect("valid backend config");
    spawn_with_backend(backend).await
}

/// Serve an arbitrary timing backend on an ephemeral local port
pub async fn spawn_with_backend<B: TimingModel>(backend: B) -> RunningServer {
    let config = ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    };
    let service = SynthesisService::with_metrics(backend, MetricsRegistry::new().unwrap());
    let server = SynthesisServer::new(config, service);

    let listener = server.bind().await.expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(listener, async move {
        let _ = stopped.await;
    }));

    RunningServer {
        addr,
        stop: Some(stop),
        handle,
    }
}

impl RunningServer {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            host: "127.0.0.1".to_string(),
            port: self.addr.port(),
            connect_timeout_ms: 2_000,
            request_timeout_secs: 10,
        }
    }

    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle
            .await
            .expect("server task panicked")
            .expect("server exited with an error");
    }
}

/// Fake synthesis server on its own runtime, for driving the client binary
pub struct BackgroundServer {
    pub port: u16,
    stop: Option<oneshot::Sender<()>>,
    runtime: Option<Runtime>,
}

impl BackgroundServer {
    pub fn start(max_frequency_ghz: f64, serve_errors: bool) -> Self {
        let runtime = Runtime::new().expect("create runtime");
        let mut server = runtime.block_on(spawn_server(max_frequency_ghz, serve_errors));
        Self {
            port: server.addr.port(),
            stop: server.stop.take(),
            runtime: Some(runtime),
        }
    }

    pub fn port_arg(&self) -> String {
        format!("--port={}", self.port)
    }
}

impl Drop for BackgroundServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// A local port with nothing listening on it
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
