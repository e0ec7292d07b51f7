//! Synthesis client
//!
//! Thin wrapper over the generated gRPC client: one connection, one
//! `compile` call per request. Failures come back as errors and never as a
//! made-up response.

use synthd_common::{ClientConfig, Frequency, Result, ServiceError};
use synthd_proto::{CompileRequest, CompileResponse, SynthesisServiceClient};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::debug;

/// Client for the synthesis service
#[derive(Clone)]
pub struct SynthesisClient {
    inner: SynthesisServiceClient<Channel>,
    endpoint: String,
}

impl SynthesisClient {
    /// Connect to the server described by `config`
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint();

        let channel = Endpoint::from_shared(endpoint.clone())
            .map_err(|e| ServiceError::config(format!("Invalid endpoint {}: {}", endpoint, e)))?
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .connect()
            .await
            .map_err(|e| {
                ServiceError::connection(format!("Failed to connect to {}: {}", endpoint, e))
            })?;

        debug!("Connected to synthesis server at {}", endpoint);

        Ok(Self {
            inner: SynthesisServiceClient::new(channel),
            endpoint,
        })
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one compile request and wait for its verdict
    pub async fn compile(
        &mut self,
        module_text: impl Into<String>,
        top_module_name: Option<&str>,
        target: Frequency,
    ) -> Result<CompileResponse> {
        let request = CompileRequest {
            module_text: module_text.into(),
            top_module_name: top_module_name.unwrap_or_default().to_string(),
            target_frequency_hz: wire_frequency(target)?,
        };

        debug!(
            "Sending compile request to {}: {} bytes at {}",
            self.endpoint,
            request.module_text.len(),
            target
        );

        let response = self
            .inner
            .compile(request)
            .await
            .map_err(|status| self.status_error(status))?;
        Ok(response.into_inner())
    }

    fn status_error(&self, status: Status) -> ServiceError {
        match status.code() {
            // tonic reports an expired `Endpoint::timeout` as CANCELLED
            Code::Cancelled | Code::DeadlineExceeded => ServiceError::timeout(format!(
                "compile request to {}: {}",
                self.endpoint,
                status.message()
            )),
            _ => ServiceError::Grpc(status),
        }
    }
}

/// Whole-Hertz value sent on the wire.
///
/// Non-positive targets pass through for the server to reject. A positive
/// target too small to survive rounding is refused here rather than sent as 0.
fn wire_frequency(target: Frequency) -> Result<i64> {
    let hz = target.whole_hz();
    if target.hz() > 0.0 && hz <= 0 {
        return Err(ServiceError::invalid_argument(format!(
            "requested frequency {} Hz rounds to 0 Hz",
            target.hz()
        )));
    }
    Ok(hz)
}
