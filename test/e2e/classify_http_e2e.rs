use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once, OnceLock};

use tempfile::{tempdir, TempDir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use recast_bot::shared::logging;
use recast_bot::{Bot, BotError, DispatchOutcome, HandlerRegistry, RecastClient};

struct ServerGuard(tokio::task::JoinHandle<()>);

impl Drop for ServerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Serves exactly one HTTP response and hands back the raw request head.
async fn spawn_fake_api(
    status_line: &'static str,
    body: &'static str,
) -> std::io::Result<(String, oneshot::Receiver<String>, ServerGuard)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut buf = vec![0u8; 4096];
        let mut read_len = 0usize;
        loop {
            let Ok(n) = socket.read(&mut buf[read_len..]).await else {
                return;
            };
            if n == 0 {
                break;
            }
            read_len += n;
            if buf[..read_len].windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
            if read_len == buf.len() {
                buf.resize(buf.len() + 4096, 0);
            }
        }
        let _ = tx.send(String::from_utf8_lossy(&buf[..read_len]).to_string());

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    Ok((format!("http://{}/request", addr), rx, ServerGuard(handle)))
}

static LOG_INIT: Once = Once::new();
static LOG_DIR: OnceLock<Option<TempDir>> = OnceLock::new();

/// Points the logger at a file in a tempdir that lives as long as the test
/// binary. The env writes happen once, before any test builds an HTTP client.
fn init_logging() {
    LOG_INIT.call_once(|| {
        let log_dir = match env::var("E2E_LOG_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => LOG_DIR
                .get_or_init(|| tempdir().ok())
                .as_ref()
                .map(|d| d.path().join("logs"))
                .unwrap_or_else(|| env::temp_dir().join("recast-bot-logs")),
        };
        env::set_var("LOG_MODE", "file");
        env::set_var("LOG_DIR", log_dir.to_string_lossy().as_ref());
        env::set_var("LOG_FORMAT", "json");
        env::set_var("RUST_LOG", "recast_bot=debug");
        logging::init();
    });
}

fn header_value<'a>(request: &'a str, name: &str) -> Option<&'a str> {
    request.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

#[tokio::test]
async fn classify_request_shape_and_intent_dispatch() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let (url, request_rx, _guard) =
        spawn_fake_api("200 OK", r#"{"results":{"intents":["flight_booking"]}}"#).await?;

    let bot = Bot::with_classifier(RecastClient::new("  secret-token \n", url)?);
    let calls: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let registry = HandlerRegistry::new()
        .on("flight_booking", move |results, ctx: &String| {
            sink.lock()
                .unwrap()
                .push(format!("{}|{}", results, ctx));
        })
        .otherwise(|_, _| panic!("otherwise must not fire"));

    let outcome = bot
        .process("book a flight", &registry, &"session-1".to_string())
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Intent {
            name: "flight_booking".to_string(),
            handlers: 1
        }
    );
    assert_eq!(
        *calls.lock().unwrap(),
        vec![r#"{"intents":["flight_booking"]}|session-1"#.to_string()]
    );

    let request = request_rx.await?;
    let request_line = request.lines().next().unwrap_or_default();
    assert_eq!(request_line, "POST /request?text=book+a+flight HTTP/1.1");
    assert_eq!(
        header_value(&request, "authorization"),
        Some("Token secret-token")
    );
    assert!(header_value(&request, "content-length").map_or(true, |v| v == "0"));
    Ok(())
}

#[tokio::test]
async fn reserved_characters_are_escaped() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let (url, request_rx, _guard) =
        spawn_fake_api("200 OK", r#"{"results":{"intents":[]}}"#).await?;

    let client = RecastClient::new("abc", url)?;
    let result = client.send("a&b=c?").await?;
    assert!(result.intents().is_empty());

    let request = request_rx.await?;
    let request_line = request.lines().next().unwrap_or_default();
    assert_eq!(request_line, "POST /request?text=a%26b%3Dc%3F HTTP/1.1");
    Ok(())
}

#[tokio::test]
async fn api_error_body_reaches_error_handler() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let (url, _request_rx, _guard) = spawn_fake_api(
        "401 Unauthorized",
        r#"{"results":null,"message":"Request is invalid"}"#,
    )
    .await?;

    let bot = Bot::with_classifier(RecastClient::new("bad-token", url)?);
    let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let registry = HandlerRegistry::new().on_error(move |err, _: &()| {
        sink.lock().unwrap().push(err.to_string());
    });

    let outcome = bot.process("hello", &registry, &()).await;

    assert_eq!(outcome, DispatchOutcome::ApiError { handled: true });
    assert_eq!(
        *errors.lock().unwrap(),
        vec!["[Recast.AI API]: Request is invalid".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let (url, _request_rx, _guard) = spawn_fake_api("502 Bad Gateway", "<html>oops</html>").await?;

    let bot = Bot::with_classifier(RecastClient::new("abc", url)?);
    let decode_errors: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));
    let sink = decode_errors.clone();
    let registry = HandlerRegistry::new().on_error(move |err, _: &()| {
        if matches!(err, BotError::Decode(_)) {
            *sink.lock().unwrap() += 1;
        }
    });

    let outcome = bot.process("hello", &registry, &()).await;

    assert_eq!(outcome, DispatchOutcome::Failed { handled: true });
    assert_eq!(*decode_errors.lock().unwrap(), 1);
    Ok(())
}

#[test]
fn logging_setup_runs_once_into_a_live_log_dir() {
    init_logging();
    let first = env::var("LOG_DIR").expect("LOG_DIR set by init_logging");
    init_logging();
    let second = env::var("LOG_DIR").expect("LOG_DIR still set");

    assert_eq!(first, second);
    assert!(PathBuf::from(&first).is_dir());
    log::info!("[e2e] log dir check");
}
