use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    config::Credential,
    error::CycleError,
    model::{CommitRequest, RemoteFileDescriptor},
};

pub mod github;

pub use github::GitHubContents;

/// Where the rendered README lives.
#[async_trait]
pub trait ContentStore: Send + Sync + Debug {
    async fn read_file(&self, credential: &Credential) -> Result<RemoteFileDescriptor, CycleError>;

    async fn write_file(
        &self,
        credential: &Credential,
        request: &CommitRequest,
    ) -> Result<(), CycleError>;
}
