use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::Server;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn scrapekit() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("scrapekit"));
    cmd.env_remove("SCRAPEKIT_PROXY");
    cmd
}

#[test]
fn test_get_prints_body() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/page")
        .with_status(200)
        .with_body("<html>hello</html>")
        .create();

    scrapekit()
        .arg("get")
        .arg(format!("{}/page", url))
        .assert()
        .success()
        .stdout("<html>hello</html>");

    mock.assert();
}

#[test]
fn test_async_get_prints_body() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/page")
        .with_status(200)
        .with_body("async body")
        .create();

    scrapekit()
        .arg("--async")
        .arg("get")
        .arg(format!("{}/page", url))
        .assert()
        .success()
        .stdout("async body");

    mock.assert();
}

#[test]
fn test_post_sends_data() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/search")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body("q=rust")
        .with_status(200)
        .with_body("results")
        .create();

    scrapekit()
        .arg("post")
        .arg(format!("{}/search", url))
        .arg("-d")
        .arg("q=rust")
        .arg("-H")
        .arg("Content-Type: application/x-www-form-urlencoded")
        .assert()
        .success()
        .stdout("results");

    mock.assert();
}

#[test]
fn test_server_errors_exhaust_attempts() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/flaky")
        .with_status(503)
        .with_body("try later")
        .expect(3)
        .create();

    scrapekit()
        .args(["--max-attempts", "3", "--retry-sleep", "0"])
        .arg("get")
        .arg(format!("{}/flaky", url))
        .assert()
        .failure()
        .stderr(predicate::str::contains("3 attempts"))
        .stderr(predicate::str::contains("503"));

    mock.assert();
}

#[test]
fn test_not_found_fails_after_one_attempt() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("nope")
        .expect(1)
        .create();

    scrapekit()
        .args(["--retry-sleep", "0"])
        .arg("get")
        .arg(format!("{}/missing", url))
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));

    mock.assert();
}

#[test]
fn test_silence_exits_cleanly_without_output() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .create();

    scrapekit()
        .arg("--silence")
        .arg("get")
        .arg(format!("{}/missing", url))
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_throttled_then_ok() {
    let mut server = Server::new();
    let url = server.url();

    // mockito keeps serving the first matching mock until its expected hits
    // are used up, so create the success mock last.
    let throttled = server
        .mock("GET", "/")
        .with_status(429)
        .expect(2)
        .create();
    let ok = server
        .mock("GET", "/")
        .with_status(200)
        .with_body("OK")
        .expect(1)
        .create();

    scrapekit()
        .args(["--max-attempts", "3", "--retry-sleep", "0"])
        .arg("get")
        .arg(&url)
        .assert()
        .success()
        .stdout("OK");

    throttled.assert();
    ok.assert();
}

#[test]
fn test_request_file_supplies_url_and_headers() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/from-file")
        .match_header("x-source", "file")
        .with_status(200)
        .with_body("file body")
        .create();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"url": "{}/from-file", "headers": {{"X-Source": "file"}}, "max_attempts": 1}}"#,
        url
    )
    .unwrap();

    scrapekit()
        .arg("--config")
        .arg(file.path())
        .arg("get")
        .assert()
        .success()
        .stdout("file body");

    mock.assert();
}

#[test]
fn test_invalid_request_file_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"retries": 3}}"#).unwrap();

    scrapekit()
        .arg("--config")
        .arg(file.path())
        .arg("get")
        .arg("https://x.test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse request file"));
}

#[test]
fn test_connection_refused_is_retried_then_reported() {
    scrapekit()
        .args(["--max-attempts", "2", "--timeout", "2"])
        .arg("get")
        .arg("http://127.0.0.1:9/")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No response from website after 2 attempts"));
}
