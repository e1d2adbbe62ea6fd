use crate::config::{SentrySettings, PRODUCTION};
use anyhow::{anyhow, Result};
use base64ct::{Base64, Encoding};
use once_cell::sync::OnceCell;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::{Compression, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::{SdkTracerProvider, Tracer},
    Resource,
};
use std::{collections::HashMap, env::var, time::Duration};
use tonic::{
    metadata::{Ascii, Binary, MetadataKey, MetadataMap, MetadataValue},
    transport::ClientTlsConfig,
};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use ulid::Ulid;

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();
static SENTRY_GUARD: OnceCell<sentry::ClientInitGuard> = OnceCell::new();

const SENTRY_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

fn parse_headers_env(headers_str: &str) -> HashMap<String, String> {
    headers_str
        .split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

// Keys ending in "-bin" are binary metadata and carry base64 values.
fn headers_to_metadata(headers: &HashMap<String, String>) -> Result<MetadataMap> {
    let mut meta = MetadataMap::with_capacity(headers.len());

    for (k, v) in headers {
        let key_str = k.to_ascii_lowercase();

        if key_str.ends_with("-bin") {
            let bytes = Base64::decode_vec(v)
                .map_err(|e| anyhow!("failed to base64-decode value for key {key_str}: {e}"))?;

            let key = MetadataKey::<Binary>::from_bytes(key_str.as_bytes())
                .map_err(|e| anyhow!("invalid binary metadata key {key_str}: {e}"))?;

            meta.insert_bin(key, MetadataValue::from_bytes(&bytes));
        } else {
            let key = MetadataKey::<Ascii>::from_bytes(key_str.as_bytes())
                .map_err(|e| anyhow!("invalid ASCII metadata key {key_str}: {e}"))?;

            let val: MetadataValue<_> = v
                .parse()
                .map_err(|e| anyhow!("invalid ASCII metadata value for key {key_str}: {e}"))?;
            meta.insert(key, val);
        }
    }

    Ok(meta)
}

fn normalize_endpoint(ep: String) -> String {
    if ep.starts_with("http://") || ep.starts_with("https://") {
        ep
    } else {
        format!("https://{}", ep.trim_end_matches('/'))
    }
}

fn init_tracer(endpoint: String) -> Result<Tracer> {
    let endpoint = normalize_endpoint(endpoint);

    let headers = var("OTEL_EXPORTER_OTLP_HEADERS")
        .ok()
        .map(|s| parse_headers_env(&s))
        .unwrap_or_default();

    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .with_compression(Compression::Gzip)
        .with_timeout(Duration::from_secs(3));

    if let Some(host) = endpoint
        .strip_prefix("https://")
        .and_then(|s| s.split('/').next())
        .and_then(|h| h.split(':').next())
    {
        let tls = ClientTlsConfig::new()
            .domain_name(host.to_string())
            .with_native_roots();
        builder = builder.with_tls_config(tls);
    }

    if !headers.is_empty() {
        builder = builder.with_metadata(headers_to_metadata(&headers)?);
    }

    let exporter = builder.build()?;

    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder_empty()
                .with_attributes(vec![
                    KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                    KeyValue::new("service.instance.id", instance_id),
                ])
                .build(),
        )
        .build();

    let _ = TRACER_PROVIDER.set(trace_provider.clone());

    global::set_tracer_provider(trace_provider.clone());
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));

    Ok(trace_provider.tracer(env!("CARGO_PKG_NAME")))
}

/// Sentry client options, `None` when no DSN is configured.
///
/// # Errors
/// Returns an error if the DSN cannot be parsed.
pub fn sentry_options(
    settings: &SentrySettings,
    node_env: Option<&str>,
) -> Result<Option<sentry::ClientOptions>> {
    let Some(dsn) = settings.dsn.as_deref() else {
        return Ok(None);
    };

    let dsn: sentry::types::Dsn = dsn
        .parse()
        .map_err(|e| anyhow!("invalid SENTRY_DSN: {e}"))?;

    Ok(Some(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        environment: node_env.map(|env| env.to_string().into()),
        debug: node_env != Some(PRODUCTION),
        traces_sample_rate: settings.traces_sample_rate,
        ..Default::default()
    }))
}

/// Initialize logging, the optional OTLP exporter and the optional Sentry
/// client. OTLP export is enabled by `OTEL_EXPORTER_OTLP_ENDPOINT`, Sentry by
/// a DSN. Sentry is initialized at most once per process; `error!` events
/// become Sentry events, lower levels become breadcrumbs.
///
/// # Errors
///
/// Returns an error if the DSN is invalid or tracer or subscriber
/// initialization fails
pub fn init(
    verbosity_level: Option<Level>,
    sentry_settings: &SentrySettings,
    node_env: Option<&str>,
) -> Result<()> {
    let verbosity_level = verbosity_level.unwrap_or(Level::ERROR);

    let fmt_layer = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .pretty();

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("tokio=error".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    let otel_layer = match var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(endpoint) => Some(tracing_opentelemetry::layer().with_tracer(init_tracer(endpoint)?)),
        Err(_) => None,
    };

    let sentry_layer = match sentry_options(sentry_settings, node_env)? {
        Some(options) => {
            SENTRY_GUARD.get_or_init(|| sentry::init(options));
            Some(sentry::integrations::tracing::layer())
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(otel_layer)
        .with(sentry_layer)
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Flush pending spans and Sentry events (noop when neither is initialized)
pub fn shutdown() {
    if let Some(tp) = TRACER_PROVIDER.get() {
        debug!("shutting down tracer provider");
        let _ = tp.shutdown();
    }

    if SENTRY_GUARD.get().is_some() {
        if let Some(client) = sentry::Hub::current().client() {
            debug!("flushing sentry events");
            client.close(Some(SENTRY_FLUSH_TIMEOUT));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers_env() {
        assert!(parse_headers_env("").is_empty());

        let result = parse_headers_env("key1 = value1 ,malformed, key2=value2");
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("key1"), Some(&"value1".to_string()));
        assert_eq!(result.get("key2"), Some(&"value2".to_string()));
    }

    #[test]
    fn test_headers_to_metadata_mixed() {
        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), "Bearer token123".to_string());
        // "binary data"
        headers.insert("custom-bin".to_string(), "YmluYXJ5IGRhdGE=".to_string());

        let metadata = headers_to_metadata(&headers).unwrap();
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn test_headers_to_metadata_invalid_base64() {
        let mut headers = HashMap::new();
        headers.insert("custom-bin".to_string(), "not-valid-base64!!!".to_string());

        let result = headers_to_metadata(&headers);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("failed to base64-decode"));
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(
            normalize_endpoint("http://localhost:4317".to_string()),
            "http://localhost:4317"
        );
        assert_eq!(
            normalize_endpoint("api.example.com:4317/".to_string()),
            "https://api.example.com:4317"
        );
    }

    #[test]
    fn test_sentry_disabled_without_dsn() {
        let options = sentry_options(&SentrySettings::default(), Some("production")).unwrap();
        assert!(options.is_none());
    }

    #[test]
    fn test_sentry_options_follow_environment() {
        let settings = SentrySettings {
            dsn: Some("https://public@o0.ingest.sentry.io/1".to_string()),
            traces_sample_rate: 0.25,
        };

        let production = sentry_options(&settings, Some("production")).unwrap().unwrap();
        assert!(!production.debug);
        assert_eq!(production.environment.as_deref(), Some("production"));
        assert!((production.traces_sample_rate - 0.25).abs() < f32::EPSILON);

        let development = sentry_options(&settings, None).unwrap().unwrap();
        assert!(development.debug);
        assert_eq!(development.environment, None);
    }

    #[test]
    fn test_sentry_invalid_dsn() {
        let settings = SentrySettings {
            dsn: Some("not a dsn".to_string()),
            ..SentrySettings::default()
        };
        assert!(sentry_options(&settings, None).is_err());
    }

    #[test]
    fn test_shutdown_without_init() {
        shutdown();
    }
}
