use std::path::{Path, PathBuf};

use gdrive_client::{
    cli::{Action, Args},
    drive::{config::SCOPE, credentials, Endpoint, FileClient},
    oauth2::token::ServiceAccountCredentials,
};
use mockito::{Matcher, Mock, ServerGuard};

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

const PRIVATE_KEY: &str = include_str!("../fixtures/test_private_key.pem");

pub fn service_account_json(token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": "test-key-id",
        "private_key": PRIVATE_KEY,
        "client_email": "tester@test-project.iam.gserviceaccount.com",
        "client_id": "1234567890",
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": token_uri,
        "auth_provider_x509_cert_url": "https://www.googleapis.com/oauth2/v1/certs",
        "client_x509_cert_url": "https://www.googleapis.com/robot/v1/metadata/x509/tester"
    })
    .to_string()
}

/// Writes a service account key whose `token_uri` targets `server_url`.
pub fn write_credentials(dir: &Path, server_url: &str) -> PathBuf {
    let path = dir.join("service_account.json");
    std::fs::write(&path, service_account_json(&format!("{server_url}/token"))).unwrap();
    path
}

pub fn token_response() -> String {
    serde_json::json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3599
    })
    .to_string()
}

pub fn token_body_matcher() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded(
            "grant_type".into(),
            "urn:ietf:params:oauth:grant-type:jwt-bearer".into(),
        ),
        Matcher::Regex(r"assertion=eyJ[\w-]+\.[\w-]+\.[\w-]+".into()),
    ])
}

pub struct DriveTestConfig {
    server: ServerGuard,
    token_mock: Mock,
    dir: tempfile::TempDir,
    credentials_path: PathBuf,
}

#[allow(dead_code)] //remove this when this issue will be fixed: https://github.com/rust-lang/rust/issues/46379
impl DriveTestConfig {
    pub async fn new() -> Self {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("POST", "/token")
            .match_body(token_body_matcher())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(token_response())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let credentials_path = write_credentials(dir.path(), &server.url());
        Self {
            server,
            token_mock,
            dir,
            credentials_path,
        }
    }

    pub fn server(&mut self) -> &mut ServerGuard {
        &mut self.server
    }

    pub fn token_mock(&self) -> &Mock {
        &self.token_mock
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    pub fn credentials_path(&self) -> &Path {
        self.credentials_path.as_path()
    }

    pub async fn credentials(&self) -> ServiceAccountCredentials {
        credentials::serviceaccount::from_file(&self.credentials_path, SCOPE)
            .await
            .unwrap()
    }

    pub async fn file_client(&self) -> FileClient<ServiceAccountCredentials> {
        FileClient::with_endpoint(self.credentials().await, Endpoint::new(&self.url()))
            .await
            .unwrap()
    }

    pub fn args(&self, action: Action, drive_id: &str, file: Option<&Path>) -> Args {
        Args {
            action,
            credentials: self.credentials_path.clone(),
            drive_id: drive_id.to_owned(),
            file: file.map(Path::to_path_buf),
            api_root: self.url(),
        }
    }

    pub fn local_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub async fn mock_mime_type(&mut self, id: &str, mime_type: &str) -> Mock {
        self.server
            .mock("GET", format!("/drive/v3/files/{id}").as_str())
            .match_query(Matcher::UrlEncoded("fields".into(), "mimeType".into()))
            .match_header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({ "mimeType": mime_type }).to_string())
            .create_async()
            .await
    }

    pub async fn mock_folder(&mut self, id: &str) -> Mock {
        self.mock_mime_type(id, FOLDER_MIME_TYPE).await
    }

    pub async fn mock_list(&mut self, q: &str, fields: &str, body: serde_json::Value) -> Mock {
        self.server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), q.into()),
                Matcher::UrlEncoded("fields".into(), fields.into()),
                Matcher::UrlEncoded("pageSize".into(), "10".into()),
            ]))
            .match_header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }
}

/// Builds a `multipart/mixed` batch reply, one `(content id, status line)` per part.
pub fn batch_response(boundary: &str, parts: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (content_id, status_line) in parts {
        body.push_str(&format!(
            "--{boundary}\r\n\
            Content-Type: application/http\r\n\
            Content-ID: <response-{content_id}>\r\n\
            \r\n\
            HTTP/1.1 {status_line}\r\n\
            Content-Type: application/json; charset=UTF-8\r\n\
            \r\n"
        ));
        if !status_line.starts_with('2') {
            body.push_str(r#"{"error": {"code": 404, "message": "File not found"}}"#);
        }
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    body
}
