//! HTTP collaborators: the tracking-sheet CSV export and the file API that
//! stores received closing reports.

use foilstatus_core::{ExternalRecord, ReceivedReport};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::SyncError;
use crate::listing::{StoredFile, reports_in_folder};
use crate::roster::parse_roster;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

/// Largest page the file API hands out.
const PAGE_SIZE: &str = "1000";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<StoredFile>,
    next_page_token: Option<String>,
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SyncError::Server {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Read-only client for the stored-document folder tree.
pub struct DriveClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DriveClient {
    /// `base_url` should be like `https://www.googleapis.com` (no trailing slash).
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.base_url)
    }

    /// List the direct children of a folder, following page tokens.
    pub async fn list_children(&self, folder_id: &str) -> Result<Vec<StoredFile>, SyncError> {
        let url = self.files_url();
        let query = format!("'{folder_id}' in parents");
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = vec![
                ("q", query.as_str()),
                ("key", self.api_key.as_str()),
                ("pageSize", PAGE_SIZE),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            debug!(url = %url, folder_id, "listing folder");
            let resp = self.client.get(&url).query(&params).send().await?;
            let page: FileList = check_status(resp).await?.json().await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    /// Walk each batch folder under `root_folder_id` and collect the closing
    /// reports filed in it.
    pub async fn fetch_received_reports(
        &self,
        root_folder_id: &str,
    ) -> Result<Vec<ReceivedReport>, SyncError> {
        info!(root_folder_id, "listing received closing reports");
        let folders: Vec<StoredFile> = self
            .list_children(root_folder_id)
            .await?
            .into_iter()
            .filter(StoredFile::is_folder)
            .collect();

        let mut reports = Vec::new();
        for folder in &folders {
            let files = self.list_children(&folder.id).await?;
            let found = reports_in_folder(&folder.name, &files);
            debug!(folder = %folder.name, files = files.len(), reports = found.len(), "listed batch folder");
            reports.extend(found);
        }

        info!(folders = folders.len(), reports = reports.len(), "listed received reports");
        Ok(reports)
    }
}

/// Download the roster CSV export and keep the requested rows.
pub async fn fetch_roster(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<ExternalRecord>, SyncError> {
    info!(url = %url, "downloading roster");
    let resp = client.get(url).send().await?;
    let body = check_status(resp).await?.text().await?;
    parse_roster(body.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // ── Local file API ──

    const ROOT_PAGE_1: &str = r#"{
        "nextPageToken": "p2",
        "files": [
            { "id": "b42", "name": "2021-0042", "mimeType": "application/vnd.google-apps.folder" },
            { "id": "stray", "name": "77.pdf", "mimeType": "application/pdf" }
        ]
    }"#;
    const ROOT_PAGE_2: &str = r#"{
        "files": [
            { "id": "b99", "name": "2021-0099", "mimeType": "application/vnd.google-apps.folder" }
        ]
    }"#;
    const BATCH_42: &str = r#"{
        "files": [
            { "id": "f1", "name": "100.pdf", "mimeType": "application/pdf" },
            { "id": "f2", "name": "cover letter.pdf", "mimeType": "application/pdf" }
        ]
    }"#;
    const BATCH_99: &str = r#"{
        "files": [ { "id": "f3", "name": "200 closing.pdf", "mimeType": "application/pdf" } ]
    }"#;

    /// Canned file-API answer for a request target such as
    /// `/drive/v3/files?q=%27b42%27+in+parents&key=..`.
    fn file_api_response(target: &str) -> (&'static str, &'static str) {
        if !target.starts_with("/drive/v3/files?")
            || !target.contains("key=test-key")
            || !target.contains("pageSize=1000")
        {
            return ("400 Bad Request", r#"{"error":"bad request"}"#);
        }
        if target.contains("%27root-folder%27") {
            if target.contains("pageToken=p2") {
                ("200 OK", ROOT_PAGE_2)
            } else {
                ("200 OK", ROOT_PAGE_1)
            }
        } else if target.contains("%27b42%27") {
            ("200 OK", BATCH_42)
        } else if target.contains("%27b99%27") {
            ("200 OK", BATCH_99)
        } else {
            ("404 Not Found", r#"{"error":"not found"}"#)
        }
    }

    async fn serve(listener: TcpListener) {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }
            let request = String::from_utf8_lossy(&request);
            let target = request.split_whitespace().nth(1).unwrap_or_default();
            let (status, body) = file_api_response(target);
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    }

    /// Start the local file API and return a client pointed at it.
    async fn local_client() -> DriveClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener));
        DriveClient::new(format!("http://{addr}/"), "test-key".into())
    }

    #[tokio::test]
    async fn children_are_collected_across_pages() {
        let client = local_client().await;
        let children = client.list_children("root-folder").await.unwrap();
        let names: Vec<&str> = children.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["2021-0042", "77.pdf", "2021-0099"]);
    }

    #[tokio::test]
    async fn reports_are_filed_under_their_folder_name() {
        let client = local_client().await;
        let reports = client.fetch_received_reports("root-folder").await.unwrap();
        assert_eq!(
            reports,
            vec![
                ReceivedReport {
                    batch_id: "2021-0042".into(),
                    complaint_id: "100".into(),
                },
                ReceivedReport {
                    batch_id: "2021-0099".into(),
                    complaint_id: "200".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let client = local_client().await;
        let err = client.list_children("missing").await.unwrap_err();
        assert!(matches!(err, SyncError::Server { status: 404, .. }));
    }

    #[test]
    fn drive_client_trims_trailing_slash() {
        let client = DriveClient::new("https://www.googleapis.com/".into(), "k".into());
        assert_eq!(client.base_url, "https://www.googleapis.com");
        assert_eq!(client.files_url(), "https://www.googleapis.com/drive/v3/files");
    }

    #[test]
    fn file_list_page_parses() {
        let page: FileList = serde_json::from_str(
            r#"{
                "kind": "drive#fileList",
                "nextPageToken": "tok",
                "files": [
                    { "id": "f1", "name": "2021-0042", "mimeType": "application/vnd.google-apps.folder" },
                    { "id": "f2", "name": "100.pdf", "mimeType": "application/pdf" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(page.files.len(), 2);
        assert!(page.files[0].is_folder());
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
    }

    #[test]
    fn file_list_without_files_is_empty() {
        let page: FileList = serde_json::from_str(r#"{ "kind": "drive#fileList" }"#).unwrap();
        assert!(page.files.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
