use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};

use crate::{
    config::Credential,
    error::{CycleError, Stage},
    model::{CommitRequest, RemoteFileDescriptor},
};

use super::ContentStore;

const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("weather-readme/", env!("CARGO_PKG_VERSION"));

/// GitHub repository contents API.
#[derive(Debug, Clone, Default)]
pub struct GitHubContents {
    http: Client,
}

impl GitHubContents {
    pub fn new() -> Self {
        Self::default()
    }

    fn authorized(&self, builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        builder
            .header(header::ACCEPT, ACCEPT)
            .header(header::AUTHORIZATION, format!("token {}", credential.token))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
    }
}

#[async_trait]
impl ContentStore for GitHubContents {
    async fn read_file(&self, credential: &Credential) -> Result<RemoteFileDescriptor, CycleError> {
        let url = credential.contents_url();

        let res = self
            .authorized(self.http.get(&url), credential)
            .send()
            .await
            .map_err(|e| CycleError::transport(Stage::Read, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| CycleError::transport(Stage::Read, e))?;

        if status != StatusCode::OK {
            return Err(CycleError::status(Stage::Read, status, &body));
        }

        let descriptor: RemoteFileDescriptor =
            serde_json::from_str(&body).map_err(|e| CycleError::Decode {
                stage: Stage::Read,
                reason: e.to_string(),
            })?;

        tracing::info!(
            stage = %Stage::Read,
            repo = %credential.repo_slug(),
            path = %descriptor.path,
            sha = %descriptor.sha,
            size = descriptor.size,
            "Fetched remote file descriptor"
        );

        Ok(descriptor)
    }

    async fn write_file(
        &self,
        credential: &Credential,
        request: &CommitRequest,
    ) -> Result<(), CycleError> {
        let url = credential.contents_url();

        let res = self
            .authorized(self.http.put(&url), credential)
            .json(request)
            .send()
            .await
            .map_err(|e| CycleError::transport(Stage::Write, e))?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res
                .text()
                .await
                .map_err(|e| CycleError::transport(Stage::Write, e))?;
            return Err(CycleError::status(Stage::Write, status, &body));
        }

        tracing::info!(
            stage = %Stage::Write,
            repo = %credential.repo_slug(),
            path = %credential.file_path,
            replaced_sha = %request.sha,
            "Committed updated file"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::SAMPLE;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credential_for(server: &MockServer) -> Credential {
        let mut cred = Credential::from_toml(SAMPLE).unwrap();
        cred.api_base_url = server.uri();
        cred
    }

    fn descriptor_json(sha: &str) -> serde_json::Value {
        serde_json::json!({
            "name": "README.md",
            "path": "README.md",
            "sha": sha,
            "size": 12,
            "url": null,
            "html_url": null,
            "git_url": null,
            "download_url": null,
            "type": "file",
            "content": "",
            "encoding": "base64"
        })
    }

    #[tokio::test]
    async fn read_sends_auth_headers_and_parses_descriptor() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/octocat/contents/README.md"))
            .and(header("Authorization", "token secret-token"))
            .and(header("Accept", "application/vnd.github.v3+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(descriptor_json("sha-1")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cred = credential_for(&mock_server);
        let descriptor = GitHubContents::new().read_file(&cred).await.unwrap();

        assert_eq!(descriptor.sha, "sha-1");
        assert_eq!(descriptor.name, "README.md");
    }

    #[tokio::test]
    async fn read_rejects_non_200() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
            .mount(&mock_server)
            .await;

        let cred = credential_for(&mock_server);
        let err = GitHubContents::new().read_file(&cred).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Read);
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Not Found"));
    }

    #[tokio::test]
    async fn read_reports_malformed_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let cred = credential_for(&mock_server);
        let err = GitHubContents::new().read_file(&cred).await.unwrap_err();

        assert!(matches!(err, CycleError::Decode { stage: Stage::Read, .. }));
    }

    #[tokio::test]
    async fn write_puts_commit_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/repos/octocat/octocat/contents/README.md"))
            .and(header("Authorization", "token secret-token"))
            .and(body_partial_json(serde_json::json!({
                "message": "Update weather",
                "sha": "sha-1",
                "content": "aGVsbG8=",
                "committer": {"name": "Octo Cat", "email": "octocat@example.com"},
                "author": {"name": "Octo Cat", "email": "octocat@example.com"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cred = credential_for(&mock_server);
        let request = CommitRequest::new(&cred, "sha-1", "hello");

        GitHubContents::new().write_file(&cred, &request).await.unwrap();
    }

    #[tokio::test]
    async fn write_conflict_is_a_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409).set_body_string("sha does not match"))
            .mount(&mock_server)
            .await;

        let cred = credential_for(&mock_server);
        let request = CommitRequest::new(&cred, "stale", "hello");
        let err = GitHubContents::new()
            .write_file(&cred, &request)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Write);
        assert!(err.to_string().contains("sha does not match"));
        assert!(matches!(err, CycleError::Status { status, .. } if status == StatusCode::CONFLICT));
    }
}
