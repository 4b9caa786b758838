use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use splitrel_github::GithubClient;
use tiny_http::{Header, Response, Server, StatusCode};

use crate::engine::Reporter;
use crate::prompt::LinePrompter;

#[derive(Default)]
pub(crate) struct CollectingReporter {
    pub infos: Vec<String>,
    pub warns: Vec<String>,
    pub errors: Vec<String>,
}

impl Reporter for CollectingReporter {
    fn info(&mut self, msg: &str) {
        self.infos.push(msg.to_string());
    }

    fn warn(&mut self, msg: &str) {
        self.warns.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }
}

pub(crate) type ScriptedPrompter = LinePrompter<Cursor<Vec<u8>>, Vec<u8>>;

/// Prompter answering from `answers`, one line per question.
pub(crate) fn scripted(answers: &str) -> ScriptedPrompter {
    LinePrompter::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new())
}

#[derive(Debug, Clone)]
pub(crate) struct SeenRequest {
    pub method: String,
    pub url: String,
    pub auth: Option<String>,
    pub body: String,
}

pub(crate) struct TestGithubServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    handle: thread::JoinHandle<()>,
}

impl TestGithubServer {
    /// Wait for the server thread and return every request it answered.
    pub fn join(self) -> Vec<SeenRequest> {
        self.handle.join().expect("join server");
        self.seen.lock().expect("lock").clone()
    }
}

/// Routes are keyed by request path including the query string. A route
/// with several responses serves them in order and then repeats the last.
/// Unknown paths answer 404.
pub(crate) fn spawn_github_server(
    mut routes: BTreeMap<String, Vec<(u16, String)>>,
    expected_requests: usize,
) -> TestGithubServer {
    let server = Server::http("127.0.0.1:0").expect("server");
    let base_url = format!("http://{}", server.server_addr());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_thread = Arc::clone(&seen);

    let handle = thread::spawn(move || {
        for _ in 0..expected_requests {
            let Ok(Some(mut req)) = server.recv_timeout(Duration::from_secs(5)) else {
                break;
            };
            let path = req.url().to_string();
            let auth = req
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());
            let mut body = String::new();
            req.as_reader().read_to_string(&mut body).expect("read body");
            seen_thread.lock().expect("lock").push(SeenRequest {
                method: req.method().to_string(),
                url: path.clone(),
                auth,
                body,
            });

            let response = match routes.get_mut(&path) {
                Some(list) if list.len() > 1 => list.remove(0),
                Some(list) if list.len() == 1 => list[0].clone(),
                _ => (404, r#"{"message":"Not Found"}"#.to_string()),
            };

            let resp = Response::from_string(response.1)
                .with_status_code(StatusCode(response.0))
                .with_header(
                    Header::from_bytes("Content-Type", "application/json").expect("header"),
                );
            req.respond(resp).expect("respond");
        }
    });

    TestGithubServer {
        base_url,
        seen,
        handle,
    }
}

pub(crate) fn route(
    routes: &mut BTreeMap<String, Vec<(u16, String)>>,
    path: &str,
    status: u16,
    body: &str,
) {
    routes
        .entry(path.to_string())
        .or_default()
        .push((status, body.to_string()));
}

/// Client pointed at a test server for both API and raw contents.
pub(crate) fn client(base: &str) -> GithubClient {
    GithubClient::new(Some("test-token".to_string()))
        .expect("client")
        .with_api_base(base)
        .with_raw_base(base)
        .with_html_base("https://github.com")
}

pub(crate) fn release_json(tag: &str, published_at: &str) -> String {
    format!(r#"{{"tag_name":"{tag}","published_at":"{published_at}"}}"#)
}

pub(crate) fn commit_json(sha: &str, message: &str) -> String {
    serde_json::json!({ "sha": sha, "commit": { "message": message } }).to_string()
}

pub(crate) fn pull_json(number: u64, title: &str, login: &str) -> String {
    serde_json::json!({
        "number": number,
        "title": title,
        "html_url": format!("https://github.com/acme/mono/pull/{number}"),
        "user": { "login": login },
    })
    .to_string()
}
