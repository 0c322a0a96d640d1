#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use cpuprom_exporter::app_state::AppState;
use cpuprom_exporter::config::ExporterConfig;
use cpuprom_exporter::router::build_router;
use cpuprom_exporter::sampler::{FailurePolicy, Sampler, SamplerExit};

use common::{sample_value, sampling_error, settings, CyclingSource, ScriptedSource};

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let ctype = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, ctype, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn metrics_renders_cpu_gauge() {
    let state = AppState::new(ExporterConfig::default()).unwrap();
    state.metrics().cpu_usage.set(21.5);
    let app = build_router(state);

    let (status, ctype, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype.as_deref(), Some("text/plain; version=0.0.4; charset=utf-8"));
    assert!(body.contains(
        "# HELP cpu_usage_percent Current CPU usage in percent\n\
         # TYPE cpu_usage_percent gauge\n\
         cpu_usage_percent 21.5\n"
    ));
    assert!(body.contains("# TYPE cpuprom_sampler_up gauge\n"));
    assert!(body.contains("# TYPE cpuprom_samples_total counter\n"));
    assert!(body.ends_with('\n'));
}

#[tokio::test]
async fn repeated_scrapes_are_identical() {
    let state = AppState::new(ExporterConfig::default()).unwrap();
    state.metrics().cpu_usage.set(64.0625);
    let app = build_router(state);

    let (_, _, a) = get(&app, "/metrics").await;
    let (_, _, b) = get(&app, "/metrics").await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn metrics_path_is_configurable() {
    let mut cfg = ExporterConfig::default();
    cfg.server.metrics_path = "/prom".into();
    let app = build_router(AppState::new(cfg).unwrap());

    let (status, _, body) = get(&app, "/prom").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sample_value(&body, "cpu_usage_percent"), 0.0);

    let (status, _, _) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_readiness() {
    let state = AppState::new(ExporterConfig::default()).unwrap();
    let app = build_router(state.clone());

    let (status, _, body) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _, _) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    state.metrics().sampler_up.set(1.0);
    let (status, _, body) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");
}

#[tokio::test(start_paused = true)]
async fn stopped_sampler_is_visible_to_scrapers() {
    let state = AppState::new(ExporterConfig::default()).unwrap();
    let (src, _calls) = ScriptedSource::new(vec![Ok(33.0), Err(sampling_error())]);
    let handle = Sampler::new(src, settings(10, FailurePolicy::Stop), state.metrics()).spawn();
    let app = build_router(state);

    assert!(matches!(handle.join().await, SamplerExit::Failed(_)));

    let (status, _, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sample_value(&body, "cpu_usage_percent"), 33.0);
    assert_eq!(sample_value(&body, "cpuprom_sampler_up"), 0.0);
    assert_eq!(sample_value(&body, "cpuprom_samples_total"), 1.0);
    assert_eq!(sample_value(&body, "cpuprom_sample_failures_total"), 1.0);

    let (status, _, _) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scrapes_while_sampling() {
    let values = vec![12.5, 87.75, 50.0, 100.0];
    let state = AppState::new(ExporterConfig::default()).unwrap();
    let handle = Sampler::new(
        CyclingSource::new(values.clone()),
        settings(0, FailurePolicy::Stop),
        state.metrics(),
    )
    .spawn();
    let app = build_router(state);

    let mut scrapes = Vec::new();
    for _ in 0..32 {
        let app = app.clone();
        scrapes.push(tokio::spawn(async move {
            let (status, _, body) = get(&app, "/metrics").await;
            assert_eq!(status, StatusCode::OK);
            sample_value(&body, "cpu_usage_percent")
        }));
    }
    for s in scrapes {
        let v = s.await.unwrap();
        assert!(v == 0.0 || values.contains(&v), "unexpected value {v}");
    }

    assert!(matches!(handle.shutdown().await, SamplerExit::Cancelled));
}
