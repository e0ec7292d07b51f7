//! Compile request handling
//!
//! Validates a request, runs it through the timing backend and turns the
//! backend's maximum frequency into a slack verdict. Failures become gRPC
//! statuses with no response body; a failed compile never carries a slack
//! value.

use crate::backend::{SynthesisInput, TimingModel};
use crate::slack;
use std::sync::Arc;
use std::time::Instant;
use synthd_common::{Frequency, MetricsRegistry, RequestGuard, Result, ServiceError, METRICS};
use synthd_proto::{CompileRequest, CompileResponse, SynthesisServiceServer};
use tonic::{Request, Response, Status};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Synthesis service
///
/// Holds only the backend and metrics handles. Nothing here is mutated by
/// request handling, so any number of requests may run concurrently.
pub struct SynthesisService<B> {
    backend: Arc<B>,
    metrics: MetricsRegistry,
}

impl<B: TimingModel> SynthesisService<B> {
    /// Create a service recording into the global metrics registry
    pub fn new(backend: B) -> Self {
        Self::with_metrics(backend, METRICS.clone())
    }

    /// Create a service recording into the given metrics registry
    pub fn with_metrics(backend: B, metrics: MetricsRegistry) -> Self {
        Self {
            backend: Arc::new(backend),
            metrics,
        }
    }

    /// Backend used for every request
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Wrap the service for a tonic router
    pub fn into_server(self) -> SynthesisServiceServer<Self> {
        SynthesisServiceServer::new(self)
    }

    /// Handle one compile request
    pub async fn handle_compile(&self, request: &CompileRequest) -> Result<CompileResponse> {
        let _guard = RequestGuard::start(&self.metrics.compile);

        let outcome = self.evaluate(request).await;

        let compile = &self.metrics.compile;
        match &outcome {
            Ok(response) => {
                compile.requests_success.inc();
                if !slack::timing_met(response.slack_ps) {
                    compile.timing_violations.inc();
                }
            }
            Err(ServiceError::InvalidArgument(_)) => compile.requests_invalid.inc(),
            Err(_) => compile.requests_failed.inc(),
        }

        outcome
    }

    async fn evaluate(&self, request: &CompileRequest) -> Result<CompileResponse> {
        let target = validate(request)?;
        let input = SynthesisInput {
            module_text: &request.module_text,
            top_module_name: Some(request.top_module_name.as_str()).filter(|name| !name.is_empty()),
            target_frequency: target,
        };

        debug!(
            "Synthesizing {} bytes at {} with {} backend",
            request.module_text.len(),
            target,
            self.backend.name()
        );

        let start = Instant::now();
        let report = self.backend.synthesize(&input).await?;
        let elapsed = start.elapsed();

        let slack_ps = slack::slack_ps(report.max_frequency, target).map_err(|e| {
            ServiceError::synthesis(format!(
                "{} backend returned an unusable timing result: {}",
                self.backend.name(),
                e
            ))
        })?;

        Ok(CompileResponse {
            slack_ps,
            max_frequency_hz: report.max_frequency.whole_hz(),
            insensitive_to_target_freq: report.insensitive_to_target_freq,
            elapsed_time_ms: elapsed.as_millis() as i64,
            diagnostics: report.diagnostics,
        })
    }
}

/// Check a request before it reaches the backend; returns the target clock
pub fn validate(request: &CompileRequest) -> Result<Frequency> {
    if request.module_text.is_empty() {
        return Err(ServiceError::invalid_argument("module_text must not be empty"));
    }
    if request.target_frequency_hz <= 0 {
        return Err(ServiceError::invalid_argument(format!(
            "target_frequency_hz must be positive, got {}",
            request.target_frequency_hz
        )));
    }
    Ok(Frequency::new(request.target_frequency_hz as f64))
}

#[tonic::async_trait]
impl<B: TimingModel> synthd_proto::SynthesisService for SynthesisService<B> {
    async fn compile(
        &self,
        request: Request<CompileRequest>,
    ) -> std::result::Result<Response<CompileResponse>, Status> {
        let request_id = Uuid::new_v4();
        let peer = request.remote_addr();
        let request = request.into_inner();

        async move {
            debug!("Compile request from {:?}", peer);
            match self.handle_compile(&request).await {
                Ok(response) => {
                    info!(
                        slack_ps = response.slack_ps,
                        max_frequency_hz = response.max_frequency_hz,
                        "Compile succeeded"
                    );
                    Ok(Response::new(response))
                }
                Err(e) => {
                    warn!("Compile failed: {}", e);
                    Err(e.to_status())
                }
            }
        }
        .instrument(info_span!("compile", %request_id))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FakeBackend, TimingReport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use synthd_proto::SynthesisService as _;
    use tonic::Code;

    const VERILOG: &str = r#"
module main(
  input wire [31:0] x,
  input wire [31:0] y,
  output wire [31:0] out
);
  assign out = x + y;
endmodule
"#;

    /// Counts calls and reports a fixed frequency
    struct CountingBackend {
        calls: AtomicUsize,
        max_frequency: Frequency,
    }

    #[tonic::async_trait]
    impl TimingModel for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        async fn synthesize(&self, _input: &SynthesisInput<'_>) -> Result<TimingReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TimingReport {
                max_frequency: self.max_frequency,
                insensitive_to_target_freq: false,
                diagnostics: vec!["counted".to_string()],
            })
        }
    }

    fn counting_service(max_frequency: Frequency) -> SynthesisService<CountingBackend> {
        SynthesisService::with_metrics(
            CountingBackend {
                calls: AtomicUsize::new(0),
                max_frequency,
            },
            MetricsRegistry::new().unwrap(),
        )
    }

    fn fake_service(max_ghz: f64, serve_errors: bool) -> SynthesisService<FakeBackend> {
        SynthesisService::with_metrics(
            FakeBackend::new(Frequency::from_ghz(max_ghz), serve_errors).unwrap(),
            MetricsRegistry::new().unwrap(),
        )
    }

    fn request(module_text: &str, target_frequency_hz: i64) -> CompileRequest {
        CompileRequest {
            module_text: module_text.to_string(),
            top_module_name: String::new(),
            target_frequency_hz,
        }
    }

    #[tokio::test]
    async fn test_slack_met_and_violated() {
        let service = fake_service(2.0, false);

        let met = service.handle_compile(&request(VERILOG, 1_000_000_000)).await.unwrap();
        assert_eq!(met.slack_ps, 500);
        assert_eq!(met.max_frequency_hz, 2_000_000_000);
        assert!(met.insensitive_to_target_freq);

        let violated = service.handle_compile(&request(VERILOG, 4_000_000_000)).await.unwrap();
        assert_eq!(violated.slack_ps, -250);

        assert_eq!(service.metrics.compile.requests_success.get(), 2);
        assert_eq!(service.metrics.compile.timing_violations.get(), 1);
    }

    #[tokio::test]
    async fn test_serve_errors_fails_every_request() {
        let service = fake_service(2.0, true);

        for target in [1, 1_000_000_000, 4_000_000_000] {
            let result = service.handle_compile(&request(VERILOG, target)).await;
            assert!(matches!(result, Err(ServiceError::Synthesis(_))));
        }

        assert_eq!(service.metrics.compile.requests_failed.get(), 3);
        assert_eq!(service.metrics.compile.requests_success.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_never_reaches_backend() {
        let service = counting_service(Frequency::from_ghz(2.0));

        let result = service.handle_compile(&request("", 1_000_000_000)).await;
        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));

        assert_eq!(service.backend().calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.metrics.compile.requests_invalid.get(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_source_is_synthesized() {
        let service = fake_service(2.0, false);

        for source in [" \n", "   \n\t"] {
            let response = service.handle_compile(&request(source, 1_000_000_000)).await.unwrap();
            assert_eq!(response.slack_ps, 500);
        }

        let counting = counting_service(Frequency::from_ghz(2.0));
        counting.handle_compile(&request("\t", 1_000_000_000)).await.unwrap();
        assert_eq!(counting.backend().calls.load(Ordering::SeqCst), 1);
        assert_eq!(counting.metrics.compile.requests_invalid.get(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_frequency_never_reaches_backend() {
        let service = counting_service(Frequency::from_ghz(2.0));

        for target in [0, -1_000_000_000] {
            let result = service.handle_compile(&request(VERILOG, target)).await;
            assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        }

        assert_eq!(service.backend().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_serve_errors() {
        let service = fake_service(2.0, true);

        let result = service.handle_compile(&request("", 1_000_000_000)).await;

        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_backend_diagnostics_are_returned() {
        let service = counting_service(Frequency::from_ghz(1.0));

        let response = service.handle_compile(&request(VERILOG, 500_000_000)).await.unwrap();

        assert_eq!(response.slack_ps, 1000);
        assert_eq!(response.diagnostics, vec!["counted".to_string()]);
        assert!(!response.insensitive_to_target_freq);
        assert_eq!(service.backend().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unusable_backend_result_is_a_synthesis_error() {
        let service = counting_service(Frequency::new(0.0));

        let result = service.handle_compile(&request(VERILOG, 1_000_000_000)).await;

        assert!(matches!(result, Err(ServiceError::Synthesis(_))));
    }

    #[tokio::test]
    async fn test_rpc_status_codes() {
        let service = fake_service(2.0, false);
        let status = service
            .compile(Request::new(request("", 1_000_000_000)))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let service = fake_service(2.0, true);
        let status = service
            .compile(Request::new(request(VERILOG, 1_000_000_000)))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Internal);
    }

    #[tokio::test]
    async fn test_rpc_success_body() {
        let service = fake_service(2.0, false);

        let response = service
            .compile(Request::new(request(VERILOG, 4_000_000_000)))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.slack_ps, -250);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_are_independent() {
        let service = Arc::new(fake_service(2.0, false));
        let mut tasks = tokio::task::JoinSet::new();

        for i in 1..=64i64 {
            let service = Arc::clone(&service);
            tasks.spawn(async move {
                let target = i * 100_000_000;
                let response = service.handle_compile(&request(VERILOG, target)).await.unwrap();
                (target, response.slack_ps)
            });
        }

        while let Some(result) = tasks.join_next().await {
            let (target, slack_ps) = result.unwrap();
            let expected = slack::slack_ps(
                Frequency::from_ghz(2.0),
                Frequency::new(target as f64),
            )
            .unwrap();
            assert_eq!(slack_ps, expected);
        }

        assert_eq!(service.metrics.compile.requests_success.get(), 64);
        assert_eq!(service.metrics.compile.active_requests.get(), 0);
    }
}
