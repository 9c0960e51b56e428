use crate::server::api;
use crate::server::session;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

fn json_ok(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/priorities") => match api::priorities_payload(path) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/players") => match api::players_payload() {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/items") => match api::items_payload(path) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/raid/start") => match session::start_payload(body) {
            Ok(payload) => json_ok(payload),
            Err(session::SessionError::Parse(err)) => {
                error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
            }
            Err(session::SessionError::Conflict(msg)) => error_response(409, "Conflict", msg),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/raid/end") => match session::end_payload() {
            Ok(payload) => json_ok(payload),
            Err(session::SessionError::Conflict(msg)) => error_response(409, "Conflict", msg),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/raid/status") => match session::status_payload() {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("PUT", "/api/raid/boss") => match session::update_boss_payload(body) {
            Ok(payload) => json_ok(payload),
            Err(session::SessionError::Parse(err)) => {
                error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
            }
            Err(session::SessionError::Conflict(msg)) => error_response(409, "Conflict", msg),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/sessions") => match session::sessions_payload() {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/history") => match api::history_payload(path) {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/loot/assign") => match session::assign_payload(body) {
            Ok(payload) => json_ok(payload),
            Err(session::SessionError::Parse(err)) => {
                error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
            }
            Err(session::SessionError::Conflict(msg)) => error_response(409, "Conflict", msg),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Masterlooter API Console</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    h1 { margin-bottom: 8px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 180px; }
  </style>
</head>
<body>
  <h1>Masterlooter Local API</h1>
  <p>Browser console for the raid loot priority endpoints.</p>

  <div class="card">
    <strong>Health</strong>
    <div><button id="health-btn">GET /api/health</button></div>
  </div>

  <div class="card">
    <strong>Priorities</strong>
    <label for="token">Token filter (optional)</label>
    <input id="token" placeholder="Vanquisher / Conqueror / Protector" />
    <label for="role">Role filter (optional)</label>
    <input id="role" placeholder="DPS / Healer / Tank" />
    <div><button id="priorities-btn">GET /api/priorities</button></div>
  </div>

  <div class="card">
    <strong>Players</strong>
    <div><button id="players-btn">GET /api/players</button></div>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');

    async function request(path) {
      output.textContent = 'Loading…';
      const response = await fetch(path);
      const text = await response.text();
      output.textContent = 'HTTP ' + response.status + '\n' + text;
    }

    document.getElementById('health-btn').addEventListener('click', () => {
      request('/api/health');
    });

    document.getElementById('players-btn').addEventListener('click', () => {
      request('/api/players');
    });

    document.getElementById('priorities-btn').addEventListener('click', () => {
      const token = document.getElementById('token').value.trim();
      const role = document.getElementById('role').value.trim();
      const params = new URLSearchParams();
      if (token) params.set('token', token);
      if (role) params.set('role', role);
      const query = params.toString();
      request('/api/priorities' + (query ? '?' + query : ''));
    });
  </script>
</body>
</html>
"#
    .to_string()
}
