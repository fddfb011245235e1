use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::config::Credential;

/// File metadata returned by `GET /repos/{owner}/{repo}/contents/{path}`.
///
/// Only `sha` is needed to commit an update; the rest is kept for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFileDescriptor {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    pub url: Option<String>,
    pub html_url: Option<String>,
    pub git_url: Option<String>,
    pub download_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(rename = "_links", default)]
    pub links: Option<FileLinks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLinks {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub git: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    pub message: String,
    /// Base64 of the rendered document.
    pub content: String,
    /// Revision being replaced; the API rejects the write if it is stale.
    pub sha: String,
    pub committer: Identity,
    pub author: Identity,
}

impl CommitRequest {
    pub fn new(credential: &Credential, sha: &str, rendered: &str) -> Self {
        let identity = Identity {
            name: credential.name.clone(),
            email: credential.email.clone(),
        };

        Self {
            message: credential.default_message.clone(),
            content: STANDARD.encode(rendered.as_bytes()),
            sha: sha.to_string(),
            committer: identity.clone(),
            author: identity,
        }
    }

    /// Decode `content` back into bytes.
    pub fn decoded_content(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.content)
    }
}

/// Summary of a successful refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub previous_sha: String,
    pub bytes_written: usize,
}
