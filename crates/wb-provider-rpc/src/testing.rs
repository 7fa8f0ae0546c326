//! Loopback JSON-RPC responder for unit tests.

use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};

type Script = HashMap<String, VecDeque<Value>>;

/// Answers each method from its own queue of responses. The last response
/// of a queue keeps repeating; unscripted methods get `-32601`.
pub(crate) struct RpcStub {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl RpcStub {
    pub fn start(script: Vec<(&str, Vec<Value>)>) -> Self {
        let script: Script = script
            .into_iter()
            .map(|(method, answers)| (method.to_owned(), answers.into()))
            .collect();
        let script = Arc::new(Mutex::new(script));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::clone(&requests);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    continue;
                };
                let Some(request) = read_request(&mut stream) else {
                    continue;
                };
                let method = request["method"].as_str().unwrap_or_default().to_owned();
                seen.lock().unwrap().push(request);
                let answer = next_answer(&mut script.lock().unwrap(), &method);
                write_response(&mut stream, &answer);
            }
        });

        Self { endpoint, requests }
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request["method"] == method)
            .count()
    }
}

pub(crate) fn result(value: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": value })
}

pub(crate) fn error(code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } })
}

/// A loopback port with nothing listening on it.
pub(crate) fn closed_endpoint() -> String {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    format!("http://127.0.0.1:{port}")
}

fn next_answer(script: &mut Script, method: &str) -> Value {
    match script.get_mut(method) {
        Some(answers) if answers.len() > 1 => answers.pop_front().unwrap(),
        Some(answers) if !answers.is_empty() => answers[0].clone(),
        _ => error(-32601, "method not found"),
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let body_start = head_end + 4;
    while buf.len() < body_start + length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    serde_json::from_slice(&buf[body_start..body_start + length]).ok()
}

fn write_response(stream: &mut TcpStream, answer: &Value) {
    let body = answer.to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
}
