//! End-to-end extraction tests against a local mock embed site.
//!
//! Exercises the whole ladder — page fetch, tag scan, script patterns,
//! encoded payloads, iframe recursion, validation — over wiremock.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streamscout::{
    DiscoveredVia, DispatchMode, EmbedClient, Extractor, MediaKind, PageScanner, Resolver,
    ResolverConfig, SourceRegistry, StreamCandidate, Validator,
};

const HLS_MIME: &str = "application/vnd.apple.mpegurl";

fn scanner() -> PageScanner {
    let client = EmbedClient::new().unwrap();
    let validator = Validator::new(client.clone(), Duration::from_millis(900));
    PageScanner::new(client, validator, 1)
}

async fn mount_playlist(server: &MockServer, at: &str) {
    Mock::given(method("HEAD"))
        .and(path(at.to_string()))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", HLS_MIME))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(at.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", HLS_MIME)
                .set_body_string("#EXTM3U\n#EXT-X-VERSION:3\n"),
        )
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn script_pattern_candidate_is_validated() {
    let server = MockServer::start().await;
    mount_playlist(&server, "/hls/master.m3u8").await;
    mount_page(
        &server,
        "/embed/movie/tt1",
        format!(
            r#"<html><body><script>
                jwplayer("player").setup({{file: "{}/hls/master.m3u8"}});
            </script></body></html>"#,
            server.uri()
        ),
    )
    .await;

    let url = format!("{}/embed/movie/tt1", server.uri());
    let candidate = scanner()
        .scan("testsource", &url, &[], Duration::from_secs(2))
        .await
        .unwrap();

    assert!(candidate.validated);
    assert_eq!(candidate.media_kind, MediaKind::Hls);
    assert_eq!(candidate.discovered_via, DiscoveredVia::InlineScript);
    assert!(candidate.url.ends_with("/hls/master.m3u8"));
}

#[tokio::test]
async fn video_tag_with_relative_url_resolves_against_page() {
    let server = MockServer::start().await;
    mount_playlist(&server, "/hls/rel.m3u8").await;
    mount_page(
        &server,
        "/watch/tt2",
        r#"<html><video src="/hls/rel.m3u8"></video></html>"#.to_string(),
    )
    .await;

    let url = format!("{}/watch/tt2", server.uri());
    let candidate = scanner()
        .scan("testsource", &url, &[], Duration::from_secs(2))
        .await
        .unwrap();

    assert!(candidate.validated);
    assert_eq!(candidate.discovered_via, DiscoveredVia::DirectTag);
    assert_eq!(candidate.url, format!("{}/hls/rel.m3u8", server.uri()));
}

#[tokio::test]
async fn base64_payload_is_decoded_and_validated() {
    let server = MockServer::start().await;
    mount_playlist(&server, "/hls/hidden.m3u8").await;
    let encoded = BASE64.encode(format!("{}/hls/hidden.m3u8", server.uri()));
    mount_page(
        &server,
        "/embed/tt3",
        format!(r#"<html><script>var u = atob("{encoded}"); play(u);</script></html>"#),
    )
    .await;

    let url = format!("{}/embed/tt3", server.uri());
    let candidate = scanner()
        .scan("testsource", &url, &[], Duration::from_secs(2))
        .await
        .unwrap();

    assert!(candidate.validated);
    assert_eq!(candidate.discovered_via, DiscoveredVia::EncodedPayload);
}

#[tokio::test]
async fn iframe_is_followed_one_level() {
    let server = MockServer::start().await;
    mount_playlist(&server, "/hls/inner.m3u8").await;
    mount_page(
        &server,
        "/outer",
        r#"<html><iframe src="/inner"></iframe></html>"#.to_string(),
    )
    .await;
    mount_page(
        &server,
        "/inner",
        r#"<html><video src="/hls/inner.m3u8"></video></html>"#.to_string(),
    )
    .await;

    let url = format!("{}/outer", server.uri());
    let candidate = scanner()
        .scan("testsource", &url, &[], Duration::from_secs(2))
        .await
        .unwrap();

    assert!(candidate.validated);
    assert!(candidate.url.ends_with("/hls/inner.m3u8"));
}

#[tokio::test]
async fn self_embedding_page_terminates_with_embed_fallback() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/loop",
        r#"<html><iframe src="/loop"></iframe></html>"#.to_string(),
    )
    .await;

    let url = format!("{}/loop", server.uri());
    let candidate = scanner()
        .scan("testsource", &url, &[], Duration::from_secs(2))
        .await
        .unwrap();

    // The visited set stops the recursion; the iframe URL itself comes
    // back as an unvalidated last resort.
    assert!(!candidate.validated);
    assert_eq!(candidate.url, url);
}

#[tokio::test]
async fn failing_validation_downgrades_candidate() {
    let server = MockServer::start().await;
    // The playlist URL serves HTML: marker in the URL, no magic in the body.
    Mock::given(method("HEAD"))
        .and(path("/fake.m3u8"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fake.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/embed/tt4",
        format!(
            r#"<html><script>var cfg = {{file: "{}/fake.m3u8"}};</script></html>"#,
            server.uri()
        ),
    )
    .await;

    let url = format!("{}/embed/tt4", server.uri());
    let candidate = scanner()
        .scan("testsource", &url, &[], Duration::from_secs(2))
        .await
        .unwrap();

    assert!(!candidate.validated);
    assert!(candidate.url.ends_with("/fake.m3u8"));
}

// A source wired to the mock server, to run the pipeline end to end.
struct LocalSource {
    base: String,
}

#[async_trait]
impl Extractor for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    fn endpoints(&self, identifier: &str) -> Vec<String> {
        vec![format!("{}/embed/movie/{identifier}", self.base)]
    }

    async fn extract(
        &self,
        scanner: &PageScanner,
        identifier: &str,
        timeout: Duration,
    ) -> Option<StreamCandidate> {
        let mut fallback = None;
        for endpoint in self.endpoints(identifier) {
            match scanner.scan(self.name(), &endpoint, &[], timeout).await {
                Some(c) if c.validated => return Some(c),
                Some(c) => fallback = fallback.or(Some(c)),
                None => {}
            }
        }
        fallback
    }
}

#[tokio::test]
async fn resolver_end_to_end_over_mock_site() {
    let server = MockServer::start().await;
    mount_playlist(&server, "/hls/master.m3u8").await;
    mount_page(
        &server,
        "/embed/movie/tt0133093",
        format!(
            r#"<html><script>player.src("{}/hls/master.m3u8");</script></html>"#,
            server.uri()
        ),
    )
    .await;

    let source: std::sync::Arc<dyn Extractor> = std::sync::Arc::new(LocalSource {
        base: server.uri(),
    });
    let registry = SourceRegistry::new(vec![source]).unwrap();
    let config = ResolverConfig {
        dispatch: DispatchMode::Sequential,
        source_timeout_ms: 3000,
        validator_timeout_ms: 900,
        ..Default::default()
    };
    let resolver = Resolver::new(config, registry).unwrap();

    let result = resolver.resolve_stream("tt0133093", "auto").await;
    assert!(result.success);
    let candidate = result.candidate.unwrap();
    assert_eq!(candidate.source_name, "local");
    assert!(candidate.validated);
    assert_eq!(candidate.media_kind, MediaKind::Hls);
    assert_eq!(result.attempted_sources, vec!["local"]);
}
