//! Line-JSON control server.
//!
//! One intent document per line over TCP; one JSON response per line back.
//! `stop` and `status` are answered immediately from shared state; anything
//! else is rejected as busy while a command runs, otherwise handed to the
//! worker over a rendezvous channel.

use crate::commands::CommandRequest;
use crate::intent::{decode_intent, Intent, Step};
use crate::status::SharedState;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::time::Duration;

/// Requests longer than this are rejected outright.
pub const MAX_LINE_BYTES: usize = 256 * 1024;

/// Doubling backoff with a ceiling, for reconnect/accept retry loops.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            current: initial,
            max,
        }
    }

    /// Delay to sleep now; the next one doubles, up to the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Accept connections forever, one reader thread per client.
pub fn serve(listener: TcpListener, state: SharedState, tx: SyncSender<CommandRequest>) {
    let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(60));
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                backoff.reset();
                tracing::info!(%addr, "control client connected");
                let state = state.clone();
                let tx = tx.clone();
                std::thread::spawn(move || handle_client(stream, state, tx));
            }
            Err(err) => {
                tracing::warn!(%err, "accept failed");
                std::thread::sleep(backoff.next_delay());
            }
        }
    }
}

fn handle_client(stream: TcpStream, state: SharedState, tx: SyncSender<CommandRequest>) {
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(err) => {
            tracing::warn!(%err, "failed to clone control stream");
            return;
        }
    };
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(%err, "control read failed");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = if line.len() > MAX_LINE_BYTES {
            error_response(format!("request exceeds {MAX_LINE_BYTES} bytes"))
        } else {
            respond_to_line(&line, &state, &tx)
        };
        if writeln!(writer, "{response}").is_err() {
            return;
        }
    }
}

fn error_response(message: impl Into<String>) -> Value {
    json!({ "success": false, "error": message.into() })
}

fn respond_to_line(line: &str, state: &SharedState, tx: &SyncSender<CommandRequest>) -> Value {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => return error_response(format!("invalid JSON: {err}")),
    };
    let intent = match decode_intent(&value) {
        Ok(intent) => intent,
        Err(err) => return error_response(err.message),
    };
    dispatch_intent(intent, state, tx)
}

/// Route an intent: immediate answers for stop/status, the busy guard and
/// the worker channel for everything else.
pub fn dispatch_intent(
    intent: Intent,
    state: &SharedState,
    tx: &SyncSender<CommandRequest>,
) -> Value {
    match &intent {
        Intent::Single(Step::Stop) => {
            state.abort.set();
            return json!({ "success": true, "message": "stopping" });
        }
        Intent::Single(Step::Status) => {
            return json!({ "success": true, "status": state.snapshot() });
        }
        _ => {}
    }

    let label = match &intent {
        Intent::Single(step) => step.verb().to_string(),
        Intent::Multi(steps) => format!("multistep ({} steps)", steps.len()),
        Intent::ParserError(_) => "parser_error".to_string(),
    };

    if !state.try_begin(&label) {
        return error_response("busy");
    }

    let (respond_to, response_rx) = sync_channel(1);
    let request = CommandRequest { intent, respond_to };
    if tx.send(request).is_err() {
        state.finish();
        return error_response("worker is gone");
    }
    match response_rx.recv() {
        Ok(response) => response,
        Err(_) => error_response("worker dropped the request"),
    }
}
