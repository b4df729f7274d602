use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{EntityClient, check_status, decode};
use crate::error::Error;
use crate::kind::{EntityKind, UpdateMode};

/// Source repository holding driver code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    /// Head commit of the checked-out branch, maintained by the engine.
    #[serde(default)]
    pub commit_hash: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Usually blanked or omitted in responses.
    #[serde(default)]
    pub password: Option<String>,
    /// `driver` or `interface`.
    #[serde(default)]
    pub repo_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<String>,
}

impl EntityKind for Repository {
    const NAME: &'static str = "repository";
    const COLLECTION: &'static str = "repositories";
    const UPDATE_MODE: UpdateMode = UpdateMode::Partial;
    const SETTABLE: &'static [&'static str] = &[
        "name",
        "description",
        "folder_name",
        "uri",
        "branch",
        "username",
        "password",
        "repo_type",
    ];
    const WRITE_ONLY: &'static [&'static str] = &["password"];

    type Entity = Self;
    type Fields = RepositoryFields;

    fn id(entity: &Self) -> &str {
        &entity.id
    }
}

/// One entry of a repository's commit history for a driver file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub commit: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subject: String,
}

impl EntityClient<'_, Repository> {
    /// `GET /repositories/{id}/commits?driver={file}`, in API order
    /// (newest first).
    pub async fn commits(&self, repo_id: &str, driver_file: &str) -> Result<Vec<Commit>, Error> {
        if repo_id.is_empty() {
            return Err(Error::NotFound {
                kind: Repository::NAME,
                id: String::new(),
            });
        }
        debug!(repo_id, driver_file, "listing driver commits");

        let path = format!("{}/{repo_id}/commits", Repository::COLLECTION);
        let raw = self
            .rest()
            .execute_with_query(
                Method::GET,
                &path,
                &[("driver", driver_file)],
                None,
                self.options(),
            )
            .await?;
        check_status(Repository::NAME, repo_id, &raw)?;
        decode(&raw)
    }

    /// Hash of the first commit the API lists for `driver_file`.
    pub async fn last_commit(&self, repo_id: &str, driver_file: &str) -> Result<String, Error> {
        self.commits(repo_id, driver_file)
            .await?
            .into_iter()
            .next()
            .map(|c| c.commit)
            .ok_or_else(|| Error::EmptyResult {
                what: format!("no commits for '{driver_file}' in repository '{repo_id}'"),
            })
    }
}
