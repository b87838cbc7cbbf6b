use dataplay::client::probe::{probe_service, ProbeStatus};
use dataplay::client::{ServiceClient, ServiceRequest, ServiceTransport};
use dataplay::session::{ActionId, FieldValue, FormFields, ResultPayload};
use dataplay::shared::ClientError;
use serde_json::json;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn spawn_service(
    status_line: &str,
    content_type: &str,
    response_body: &str,
) -> (String, Receiver<CapturedRequest>) {
    spawn_service_bytes(status_line, content_type, response_body.as_bytes())
}

/// Serves one canned response and hands back what the client sent.
fn spawn_service_bytes(
    status_line: &str,
    content_type: &str,
    response_body: &[u8],
) -> (String, Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let status_line = status_line.to_string();
    let content_type = content_type.to_string();
    let response_body = response_body.to_vec();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .expect("read request line");

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.trim_end().split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        let content_length = headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read body");

        let head = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            response_body.len()
        );
        stream.write_all(head.as_bytes()).expect("write head");
        stream.write_all(&response_body).expect("write body");
        let _ = tx.send(CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            headers,
            body,
        });
    });

    (format!("http://{}", addr), rx)
}

fn client(base: &str) -> ServiceClient {
    ServiceClient::new(base, Duration::from_secs(5))
}

fn closed_port_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

#[test]
fn reduce_files_posts_multipart_form_with_n_keep() {
    let (base, captured) = spawn_service("200 OK", "application/json", r#"{"kept":3}"#);
    let mut fields = FormFields::new();
    fields.insert("n_keep".to_string(), FieldValue::text("3"));

    let result = client(&base)
        .execute(&ServiceRequest::for_action(ActionId::ReduceFiles, &fields))
        .expect("reduce files");
    assert_eq!(result, ResultPayload::Json(json!({"kept": 3})));

    let request = captured
        .recv_timeout(Duration::from_secs(5))
        .expect("captured request");
    assert!(
        request.request_line.starts_with("POST /reduce-files/ "),
        "unexpected request line: {}",
        request.request_line
    );
    let content_type = request.header("content-type").expect("content type");
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");
    let body = String::from_utf8(request.body.clone()).expect("utf8 body");
    assert_eq!(
        body,
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"n_keep\"\r\n\r\n3\r\n--{boundary}--\r\n"
        )
    );
}

#[test]
fn modify_batch_uploads_the_instruction_file() {
    let (base, captured) = spawn_service("200 OK", "application/json", r#"{"applied":true}"#);
    let mut fields = FormFields::new();
    fields.insert(
        "instruction_file".to_string(),
        FieldValue::File {
            file_name: "fixes.csv".to_string(),
            contents: b"column,action\nprice,fill\n".to_vec(),
        },
    );

    client(&base)
        .execute(&ServiceRequest::for_action(ActionId::ModifyBatch, &fields))
        .expect("modify batch");

    let request = captured
        .recv_timeout(Duration::from_secs(5))
        .expect("captured request");
    assert!(request.request_line.starts_with("POST /modify-data-batch/ "));
    let body = String::from_utf8(request.body).expect("utf8 body");
    assert!(body.contains(
        "Content-Disposition: form-data; name=\"instruction_file\"; filename=\"fixes.csv\"\r\nContent-Type: text/csv\r\n\r\ncolumn,action\nprice,fill\n\r\n"
    ));
}

#[test]
fn original_sql_body_is_returned_as_raw_text() {
    let sql = "CREATE TABLE orders (\n  id INT\n);\n";
    let (base, captured) = spawn_service("200 OK", "application/json", sql);

    let result = client(&base)
        .execute(&ServiceRequest::for_action(
            ActionId::GetOriginalSql,
            &FormFields::new(),
        ))
        .expect("original sql");
    assert_eq!(result, ResultPayload::Text(sql.to_string()));

    let request = captured
        .recv_timeout(Duration::from_secs(5))
        .expect("captured request");
    assert!(request
        .request_line
        .starts_with("GET /get-original-sql-contents/ "));
}

#[test]
fn original_sql_with_invalid_utf8_is_still_text() {
    let (base, _captured) = spawn_service_bytes(
        "200 OK",
        "text/plain",
        b"INSERT INTO names VALUES ('caf\xe9');\n",
    );

    let result = client(&base)
        .execute(&ServiceRequest::for_action(
            ActionId::GetOriginalSql,
            &FormFields::new(),
        ))
        .expect("original sql");
    assert_eq!(
        result,
        ResultPayload::Text("INSERT INTO names VALUES ('caf\u{fffd}');\n".to_string())
    );
}

#[test]
fn form_service_errors_keep_status_and_body() {
    let (base, _captured) = spawn_service(
        "422 Unprocessable Entity",
        "application/json",
        r#"{"detail":"n_keep too large"}"#,
    );
    let mut fields = FormFields::new();
    fields.insert("n_keep".to_string(), FieldValue::text("99"));

    let err = client(&base)
        .execute(&ServiceRequest::for_action(ActionId::ReduceFiles, &fields))
        .expect_err("service error");
    match &err {
        ClientError::Service {
            status,
            reason,
            body,
            ..
        } => {
            assert_eq!(*status, 422);
            assert_eq!(reason, "Unprocessable Entity");
            assert!(body.contains("n_keep too large"));
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[test]
fn form_request_to_a_closed_port_is_a_connectivity_error() {
    let mut fields = FormFields::new();
    fields.insert("question".to_string(), FieldValue::text("how many rows?"));
    let err = client(&closed_port_base())
        .execute(&ServiceRequest::for_action(ActionId::AskCsvQuestion, &fields))
        .expect_err("connectivity error");
    assert!(err.is_connectivity(), "{err:?}");
}

#[test]
fn non_success_status_is_a_service_error() {
    let (base, _captured) = spawn_service(
        "400 Bad Request",
        "application/json",
        r#"{"detail":"unknown industry"}"#,
    );
    let mut fields = FormFields::new();
    fields.insert("industry".to_string(), FieldValue::text("mining"));
    fields.insert("subdomain".to_string(), FieldValue::text("coal"));

    let err = client(&base)
        .execute(&ServiceRequest::for_action(ActionId::GenerateIdeal, &fields))
        .expect_err("service error");
    match &err {
        ClientError::Service { status, body, .. } => {
            assert_eq!(*status, 400);
            assert!(body.contains("unknown industry"));
        }
        other => panic!("expected service error, got {other:?}"),
    }
    assert!(err.to_string().contains("400 Bad Request"));
}

#[test]
fn malformed_json_is_a_decode_error() {
    let (base, _captured) = spawn_service("200 OK", "application/json", "<html>oops</html>");
    let err = client(&base)
        .execute(&ServiceRequest::for_action(
            ActionId::MissingValues,
            &FormFields::new(),
        ))
        .expect_err("decode error");
    assert!(matches!(err, ClientError::Decode { .. }), "{err:?}");
}

#[test]
fn unreachable_service_is_a_connectivity_error() {
    let err = client(&closed_port_base())
        .execute(&ServiceRequest::for_action(
            ActionId::RefreshAgent,
            &FormFields::new(),
        ))
        .expect_err("connectivity error");
    assert!(err.is_connectivity(), "{err:?}");
}

#[test]
fn probe_reports_each_status() {
    let (base, captured) = spawn_service("200 OK", "application/json", "{}");
    assert_eq!(probe_service(&client(&base)), ProbeStatus::Reachable);
    let request = captured
        .recv_timeout(Duration::from_secs(5))
        .expect("captured probe");
    assert!(request.request_line.starts_with("GET /errors-analysis/ "));

    let (base, _captured) = spawn_service("503 Service Unavailable", "text/plain", "down");
    assert_eq!(
        probe_service(&client(&base)),
        ProbeStatus::ServiceError {
            status: 503,
            reason: "Service Unavailable".to_string()
        }
    );

    let status = probe_service(&client(&closed_port_base()));
    assert!(matches!(status, ProbeStatus::Unreachable(_)), "{status:?}");
    assert!(status
        .display_line()
        .starts_with("Backend not reachable: "));
}
