use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread;
use std::time::{Duration, Instant};

const HEADER_END: &[u8] = b"\r\n\r\n";

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ServerHandle {
    /// `METHOD /path` for every request served so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a small JSON API for tests.
///
/// `GET /items` lists one test record and one real record, `POST /items`
/// answers 201, `DELETE /items/{id}` answers 204, `/fail` answers 500, and
/// everything else answers 200.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let recorded = Arc::clone(&recorded);
                    thread::spawn(move || handle_client(stream, &recorded));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
            requests,
        },
    ))
}

/// Like [`spawn_http_server`], but skips when the sandbox forbids sockets.
///
/// # Errors
///
/// Returns an error for any other listener failure.
pub fn spawn_http_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_http_server() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_END.len())
        .position(|window| window == HEADER_END)
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Reads one request and returns `(method, path)`.
fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(chunk.get(..read)?);
        if let Some(end) = find_header_end(&buffer) {
            break end;
        }
    };
    let head = String::from_utf8_lossy(buffer.get(..header_end)?).into_owned();
    let body_start = header_end.checked_add(HEADER_END.len())?;
    let wanted = content_length(&head);
    while buffer.len().saturating_sub(body_start) < wanted {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(chunk.get(..read)?);
    }

    let mut request_line = head.lines().next()?.split_whitespace();
    let method = request_line.next()?.to_owned();
    let path = request_line.next()?.to_owned();
    Some((method, path))
}

fn route(method: &str, path: &str) -> (u16, &'static str, &'static str) {
    match (method, path) {
        ("GET", "/items") => (
            200,
            "OK",
            r#"[{"id":1,"name":"Test item"},{"id":2,"name":"Production item"}]"#,
        ),
        ("POST", "/items") => (201, "Created", r#"{"id":3}"#),
        ("DELETE", _) => (204, "No Content", ""),
        (_, "/fail") => (500, "Internal Server Error", r#"{"error":"boom"}"#),
        _ => (200, "OK", "{}"),
    }
}

fn handle_client(mut stream: TcpStream, recorded: &Mutex<Vec<String>>) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Some((method, path)) = read_request(&mut stream) else {
        return;
    };
    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(format!("{} {}", method, path));

    let (status, reason, body) = route(&method, &path);
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `apistress` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_apistress<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = apistress_bin()?;
    Command::new(bin)
        .args(args)
        .env("APISTRESS_LOG", "error")
        .env_remove("APISTRESS_BASE_URL")
        .env_remove("APISTRESS_AUTH_TOKEN")
        .env_remove("APISTRESS_API_KEY")
        .output()
        .map_err(|err| format!("run apistress failed: {}", err))
}

/// Spawn the `apistress` binary with piped output.
///
/// # Errors
///
/// Returns an error if the process cannot be started.
pub fn spawn_apistress<I, S>(args: I) -> Result<Child, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = apistress_bin()?;
    Command::new(bin)
        .args(args)
        .env("APISTRESS_LOG", "error")
        .env_remove("APISTRESS_BASE_URL")
        .env_remove("APISTRESS_AUTH_TOKEN")
        .env_remove("APISTRESS_API_KEY")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| format!("spawn apistress failed: {}", err))
}

/// Poll until the server has seen at least one request.
#[must_use]
pub fn wait_for_first_request(server: &ServerHandle, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !server.requests().is_empty() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

/// Deliver SIGTERM to a child process.
///
/// # Errors
///
/// Returns an error if `kill` cannot be run or reports a failure.
#[cfg(unix)]
pub fn send_sigterm(child: &Child) -> Result<(), String> {
    let status = Command::new("kill")
        .args(["-TERM", child.id().to_string().as_str()])
        .status()
        .map_err(|err| format!("run kill failed: {}", err))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("kill exited with {:?}", status.code()))
    }
}

/// Wait for a child process to exit.
///
/// # Errors
///
/// Returns an error if waiting fails or the timeout is exceeded.
pub fn wait_for_exit(child: &mut Child, timeout: Duration) -> Result<ExitStatus, String> {
    let start = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|err| format!("wait failed: {}", err))?
        {
            return Ok(status);
        }
        if start.elapsed() > timeout {
            drop(child.kill());
            return Err("process timed out".to_owned());
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// Read captured stdout from a finished child.
///
/// # Errors
///
/// Returns an error if the stream cannot be read.
pub fn read_child_stdout(child: &mut Child) -> Result<String, String> {
    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_string(&mut stdout)
            .map_err(|err| format!("read stdout failed: {}", err))?;
    }
    Ok(stdout)
}

fn apistress_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_apistress").map_or_else(
        || Err("CARGO_BIN_EXE_apistress missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

#[must_use]
pub fn describe(output: &Output) -> String {
    format!(
        "status: {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
