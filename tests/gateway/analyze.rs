use character_checker::config::Config;
use character_checker::gateway::run_gateway_with_listener;
use character_checker::media::preprocess::encode_png;
use image::{Rgb, RgbImage};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STRIPES: [[u8; 3]; 5] = [
    [200, 30, 30],
    [240, 200, 40],
    [250, 140, 20],
    [120, 20, 60],
    [255, 240, 220],
];

struct GatewayTestServer {
    port: u16,
    uploads: TempDir,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    async fn start(gemini_base_url: &str, models: &[&str]) -> Self {
        Self::start_with(gemini_base_url, models, |_| {}).await
    }

    async fn start_with(
        gemini_base_url: &str,
        models: &[&str],
        tweak: impl FnOnce(&mut Config),
    ) -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        let uploads = TempDir::new().expect("temp upload dir should be created");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config::default();
        config.workspace_dir = workspace.path().to_path_buf();
        config.config_path = workspace.path().join("config.toml");
        config.vision.api_key = Some("test-key".to_string());
        config.vision.base_url = gemini_base_url.to_string();
        config.vision.models = models.iter().map(ToString::to_string).collect();
        config.vision.timeout_secs = 5;
        config.uploads.dir = Some(uploads.path().to_path_buf());
        tweak(&mut config);
        config.validate().expect("test config should validate");

        let host = "127.0.0.1".to_string();
        let handle =
            tokio::spawn(async move { run_gateway_with_listener(&host, listener, config).await });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            uploads,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}

fn stripes_png() -> Vec<u8> {
    let img = RgbImage::from_fn(100, 100, |x, _| Rgb(STRIPES[(x / 20) as usize]));
    encode_png(&img).expect("png should encode")
}

fn form_with(files: Vec<Vec<u8>>) -> Form {
    files
        .into_iter()
        .enumerate()
        .fold(Form::new(), |form, (i, bytes)| {
            form.part(
                "files",
                Part::bytes(bytes).file_name(format!("image_{i}.png")),
            )
        })
}

async fn post_analyze(server: &GatewayTestServer, files: Vec<Vec<u8>>) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(server.url("/analyze"))
        .multipart(form_with(files))
        .send()
        .await
        .expect("analyze request should complete");
    let status = response.status();
    let body = response.json().await.expect("analyze response should be json");
    (status, body)
}

fn gemini_answer(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

#[tokio::test]
async fn analyze_fuses_gemini_answer_with_palettes() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/gemini-ok:generateContent$"))
        .and(query_param("key", "test-key"))
        .respond_with(gemini_answer(
            "**CONSISTENCY_SCORE:** 97\n\nKEY_FEATURES:\n- Red scarf\n- Amber eyes\n\nISSUES:\n- Scarf is shorter in image 2\n\nRECOMMENDATIONS:\n- Keep a turnaround sheet\n",
        ))
        .expect(1)
        .mount(&gemini)
        .await;

    let server = GatewayTestServer::start(&gemini.uri(), &["gemini-ok"]).await;
    let (status, body) = post_analyze(&server, vec![stripes_png(), stripes_png()]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["consistency_score"], 97);
    assert_eq!(body["num_images_analyzed"], 2);
    assert_eq!(body["analysis_type"], "Gemini AI Vision + Color Analysis");
    assert_eq!(body["model"], "gemini-ok");
    assert_eq!(
        body["issues"],
        serde_json::json!(["None detected - character maintains excellent consistency"])
    );
    assert_eq!(body["key_features"][0], "Red scarf");
    assert_eq!(body["color_analysis"]["color_similarity"], 100.0);
    assert_eq!(
        body["color_analysis"]["dominant_colors"]
            .as_array()
            .map(Vec::len),
        Some(3)
    );

    // One request directory holding both normalized images.
    let dirs: Vec<_> = std::fs::read_dir(server.uploads.path())
        .expect("upload dir readable")
        .collect();
    assert_eq!(dirs.len(), 1);
}

#[tokio::test]
async fn analyze_falls_back_to_next_model_then_color_only() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(2)
        .mount(&gemini)
        .await;

    let server = GatewayTestServer::start(&gemini.uri(), &["first", "second"]).await;
    let (status, body) = post_analyze(&server, vec![stripes_png(), stripes_png()]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis_type"], "Color Analysis Only");
    assert!(body["model"].is_null());
    assert_eq!(body["consistency_score"], 100);
    let issue = body["issues"][0].as_str().expect("issue text");
    assert!(issue.starts_with("AI analysis unavailable:"), "{issue}");
}

#[tokio::test]
async fn hanging_gemini_still_gets_a_color_only_report() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(
            gemini_answer("CONSISTENCY_SCORE: 90").set_delay(Duration::from_secs(10)),
        )
        .mount(&gemini)
        .await;

    // Same proportions as the defaults: three models whose per-attempt
    // timeouts add up past the gateway timeout.
    let server = GatewayTestServer::start_with(&gemini.uri(), &["a", "b", "c"], |config| {
        config.vision.timeout_secs = 1;
        config.vision.total_timeout_secs = 1;
        config.gateway.request_timeout_secs = 2;
    })
    .await;
    let (status, body) = post_analyze(&server, vec![stripes_png(), stripes_png()]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis_type"], "Color Analysis Only");
    assert_eq!(body["consistency_score"], 100);
    let issue = body["issues"][0].as_str().expect("issue text");
    assert!(issue.starts_with("AI analysis unavailable:"), "{issue}");
}

#[tokio::test]
async fn wrong_image_count_is_a_soft_failure() {
    let gemini = MockServer::start().await;
    let server = GatewayTestServer::start(&gemini.uri(), &["unused"]).await;

    let (status, body) = post_analyze(&server, vec![stripes_png()]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"error": "Please upload 2-5 images"}));
}

#[tokio::test]
async fn flat_image_is_unprocessable() {
    let gemini = MockServer::start().await;
    let server = GatewayTestServer::start(&gemini.uri(), &["unused"]).await;
    let flat = encode_png(&RgbImage::from_pixel(64, 64, Rgb([5, 5, 5]))).expect("png");

    let (status, body) = post_analyze(&server, vec![stripes_png(), flat]).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error = body["error"].as_str().expect("error text");
    assert!(error.starts_with("Image 2 could not be analyzed"), "{error}");
}
