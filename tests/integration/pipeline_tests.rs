use link_harvest::config::{
    Config, FirstPassConfig, InputConfig, OutputConfig, RateLimitKind, SecondPassConfig,
};
use link_harvest::crawler::{harvest, FixedDelay, Pipeline, Unlimited};
use link_harvest::tabular::{load_seeds, save_results};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing the second pass at `base_domain`
fn create_test_config(base_domain: &str, accumulate: bool) -> Config {
    Config {
        first_pass: FirstPassConfig::default(),
        second_pass: SecondPassConfig {
            base_domain: base_domain.to_string(),
            selector: "div.btn.sort.sort-version-on-pc a".to_string(),
            attribute: "data-link-version".to_string(),
            rate_limit: RateLimitKind::None,
            delay_ms: 0,
            accumulate,
        },
        input: InputConfig {
            path: "seeds.csv".to_string(),
            column: 0,
            has_headers: false,
        },
        output: OutputConfig {
            path: "results.csv".to_string(),
        },
    }
}

/// A seed page carrying first-pass links
fn seed_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<a class="btn btn-default btn-thongso" href="{}">Thong so</a>"#,
                href
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

/// A second-pass page carrying version links
fn versions_page(versions: &[&str]) -> String {
    let anchors: String = versions
        .iter()
        .map(|v| format!(r#"<a data-link-version="{}">version</a>"#, v))
        .collect();
    format!(
        r#"<html><body><div class="btn sort sort-version-on-pc">{}</div></body></html>"#,
        anchors
    )
}

async fn mount_page(server: &MockServer, page: &str, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(hits)
        .mount(server)
        .await;
}

/// Seeds /a -> [/x] and /b -> [/x, /y]; /x and /y each have versions
async fn mount_two_seed_scenario(server: &MockServer) {
    mount_page(server, "/a", seed_page(&["/x"]), 1).await;
    mount_page(server, "/b", seed_page(&["/x", "/y"]), 1).await;
    // Each unique href is visited exactly once
    mount_page(server, "/x", versions_page(&["/x/v1", "/x/v2"]), 1).await;
    mount_page(server, "/y", versions_page(&["/y/v1"]), 1).await;
}

#[tokio::test]
async fn test_two_seeds_shared_link_overwrite() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_two_seed_scenario(&server).await;

    let config = create_test_config(&base, false);
    let seeds = vec![format!("{}/a", base), format!("{}/b", base)];

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(seeds)
        .await
        .expect("Pipeline failed");

    assert_eq!(outcome.harvest.tasks_spawned, 2);
    assert_eq!(outcome.harvest.values_sent, 3);
    assert_eq!(outcome.second_pass.received, 3);
    assert_eq!(outcome.second_pass.unique, 2);
    assert_eq!(outcome.second_pass.duplicates, 1);

    // Only whichever of /x and /y was processed last survives
    let x_results = vec![format!("{}/x/v1", base), format!("{}/x/v2", base)];
    let y_results = vec![format!("{}/y/v1", base)];
    let results = outcome.results().to_vec();
    assert!(
        results == x_results || results == y_results,
        "Unexpected results: {:?}",
        results
    );
}

#[tokio::test]
async fn test_two_seeds_shared_link_accumulate() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_two_seed_scenario(&server).await;

    let config = create_test_config(&base, true);
    let seeds = vec![format!("{}/a", base), format!("{}/b", base)];

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(seeds)
        .await
        .expect("Pipeline failed");

    let mut results = outcome.into_results();
    results.sort();
    assert_eq!(
        results,
        vec![
            format!("{}/x/v1", base),
            format!("{}/x/v2", base),
            format!("{}/y/v1", base)
        ]
    );
}

#[tokio::test]
async fn test_one_task_per_seed() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path_regex("^/seed/[0-9]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(seed_page(&["/shared"])))
        .expect(20)
        .mount(&server)
        .await;
    mount_page(&server, "/shared", versions_page(&["/v"]), 1).await;

    let config = create_test_config(&base, false);
    let seeds: Vec<String> = (0..20).map(|i| format!("{}/seed/{}", base, i)).collect();

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(seeds)
        .await
        .expect("Pipeline failed");

    assert_eq!(outcome.harvest.tasks_spawned, 20);
    assert_eq!(outcome.harvest.pages_harvested, 20);
    assert_eq!(outcome.second_pass.received, 20);
    assert_eq!(outcome.second_pass.unique, 1);
    assert_eq!(outcome.results(), &[format!("{}/v", base)]);
}

#[tokio::test]
async fn test_bounded_pool_completes_all_seeds() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path_regex("^/seed/[0-9]+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(seed_page(&["/shared"]))
                .set_delay(Duration::from_millis(20)),
        )
        .expect(10)
        .mount(&server)
        .await;
    mount_page(&server, "/shared", versions_page(&["/v"]), 1).await;

    let mut config = create_test_config(&base, false);
    config.first_pass.max_concurrent_fetches = Some(3);
    let seeds: Vec<String> = (0..10).map(|i| format!("{}/seed/{}", base, i)).collect();

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(seeds)
        .await
        .expect("Pipeline failed");

    assert_eq!(outcome.harvest.tasks_spawned, 10);
    assert_eq!(outcome.harvest.pages_harvested, 10);
}

#[tokio::test]
async fn test_failed_seed_contributes_nothing() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/alive", seed_page(&["/x"]), 1).await;
    mount_page(&server, "/x", versions_page(&["/x/v1"]), 1).await;

    let config = create_test_config(&base, false);
    let seeds = vec![format!("{}/dead", base), format!("{}/alive", base)];

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(seeds)
        .await
        .expect("Pipeline failed");

    assert_eq!(outcome.harvest.tasks_spawned, 2);
    assert_eq!(outcome.harvest.fetch_failures, 1);
    assert_eq!(outcome.harvest.values_sent, 1);
    assert_eq!(outcome.results(), &[format!("{}/x/v1", base)]);
}

#[tokio::test]
async fn test_malformed_markup_does_not_crash() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x3c, 0x61, 0xff, 0xfe, 0xfd, 0x00]))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&base, false);
    let seeds = vec![format!("{}/garbage", base)];

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(seeds)
        .await
        .expect("Pipeline failed");

    assert_eq!(outcome.harvest.parse_failures, 1);
    assert_eq!(outcome.harvest.panicked, 0);
    assert_eq!(outcome.second_pass.received, 0);
    assert!(outcome.results().is_empty());
}

#[tokio::test]
async fn test_legacy_charset_pages_are_harvested() {
    let server = MockServer::start().await;
    let base = server.uri();

    // "Thông sé" encoded in windows-1258, not valid UTF-8
    let seed_bytes = b"<a class=\"btn-default btn-thongso\" href=\"/x\">Th\xF4ng s\xE9</a>".to_vec();

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=windows-1258")
                .set_body_bytes(seed_bytes),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/x", versions_page(&["/x/v1"]), 1).await;

    let config = create_test_config(&base, false);

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(vec![format!("{}/a", base)])
        .await
        .expect("Pipeline failed");

    assert_eq!(outcome.harvest.parse_failures, 0);
    assert_eq!(outcome.harvest.values_sent, 1);
    assert_eq!(outcome.results(), &[format!("{}/x/v1", base)]);
}

#[tokio::test]
async fn test_unreachable_seed_is_absorbed() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/ok", seed_page(&[]), 1).await;

    let config = create_test_config(&base, false);
    let seeds = vec!["not a url".to_string(), format!("{}/ok", base)];

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(seeds)
        .await
        .expect("Pipeline failed");

    assert_eq!(outcome.harvest.fetch_failures, 1);
    assert_eq!(outcome.harvest.pages_harvested, 1);
    assert!(outcome.results().is_empty());
}

#[tokio::test]
async fn test_second_pass_is_rate_limited() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/a", seed_page(&["/x", "/y", "/x"]), 1).await;
    mount_page(&server, "/x", versions_page(&["/1"]), 1).await;
    mount_page(&server, "/y", versions_page(&["/2"]), 1).await;

    let delay = Duration::from_millis(100);
    let config = create_test_config(&base, true);

    let start = Instant::now();
    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(FixedDelay::new(delay))
        .run(vec![format!("{}/a", base)])
        .await
        .expect("Pipeline failed");

    // Two unique hrefs, so two delays; the duplicate costs nothing
    assert!(start.elapsed() >= delay * 2);
    assert_eq!(outcome.second_pass.unique, 2);
    assert_eq!(outcome.second_pass.duplicates, 1);
}

#[tokio::test]
async fn test_no_seeds_produces_empty_output() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri(), false);

    let outcome = Pipeline::from_config(&config)
        .expect("Failed to build pipeline")
        .with_limiter(Unlimited)
        .run(vec![])
        .await
        .expect("Pipeline failed");

    assert_eq!(outcome.harvest.tasks_spawned, 0);
    assert!(outcome.results().is_empty());
}

#[tokio::test]
async fn test_csv_in_csv_out() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/a", seed_page(&["/x"]), 1).await;
    mount_page(&server, "/x", versions_page(&["/x/v1", "/x/v2"]), 1).await;

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("seeds.csv");
    let output = dir.path().join("results.csv");
    std::fs::write(&input, format!("url\n{}/a\n\n", base)).unwrap();

    let mut config = create_test_config(&base, false);
    config.input.has_headers = true;

    let seeds = load_seeds(&input, config.input.column, config.input.has_headers).unwrap();
    assert_eq!(seeds, vec![format!("{}/a", base)]);

    let outcome = harvest(&config, seeds).await.expect("Harvest failed");
    save_results(&output, outcome.results()).unwrap();

    let written = load_seeds(&output, 0, false).unwrap();
    assert_eq!(
        written,
        vec![format!("{}/x/v1", base), format!("{}/x/v2", base)]
    );
}
