// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Source actions for repository connections and S3 objects

use super::{SourceProvider, SourceRequest};
use crate::action::{Action, ActionCategory};
use crate::segment::{SourceRepository, SourceTrigger};

/// Built-in source provider covering every [`SourceRepository`] connector
pub struct ConnectionSourceProvider;

impl ConnectionSourceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConnectionSourceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceProvider for ConnectionSourceProvider {
    fn source(&self, request: &SourceRequest<'_>) -> Action {
        let base = |provider: &str| {
            Action::new(request.action_name, ActionCategory::Source, provider)
                .with_output(request.output)
                .with_namespace(request.repository.variables_namespace().map(str::to_string))
        };

        match request.repository {
            SourceRepository::CodeStar(c) => base("CodeStarSourceConnection")
                .with_config("ConnectionArn", c.connection_arn.as_str())
                .with_config("FullRepositoryId", format!("{}/{}", c.owner, c.repository))
                .with_config("BranchName", c.branch.as_str())
                .with_config("DetectChanges", c.trigger_on_push),
            SourceRepository::GitHub(g) => base("GitHub")
                .with_config("Owner", g.owner.as_str())
                .with_config("Repo", g.repository.as_str())
                .with_config("Branch", g.branch.as_str())
                .with_config(
                    "OAuthToken",
                    format!("{{{{resolve:secretsmanager:{}}}}}", g.oauth_secret),
                )
                .with_config("PollForSourceChanges", g.trigger == SourceTrigger::Poll),
            SourceRepository::CodeCommit(c) => base("CodeCommit")
                .with_config("RepositoryName", c.repository.as_str())
                .with_config("BranchName", c.branch.as_str())
                .with_config("PollForSourceChanges", c.trigger == SourceTrigger::Poll),
            SourceRepository::S3(s) => base("S3")
                .with_config("S3Bucket", s.bucket.as_str())
                .with_config("S3ObjectKey", s.key.as_str())
                .with_config("PollForSourceChanges", s.trigger == SourceTrigger::Poll),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(repository: &SourceRepository) -> Action {
        ConnectionSourceProvider::new().source(&SourceRequest {
            action_name: "fetch",
            repository,
            output: "Source",
        })
    }

    #[test]
    fn test_code_star_configuration() {
        let repo = SourceRepository::code_star("arn:aws:codeconnections:conn", "acme", "infra")
            .with_branch("main");
        let action = source(&repo);

        assert_eq!(action.provider, "CodeStarSourceConnection");
        assert_eq!(action.config_str("FullRepositoryId"), Some("acme/infra"));
        assert_eq!(action.config_str("BranchName"), Some("main"));
        assert_eq!(action.config("DetectChanges"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(action.outputs, vec!["Source"]);
    }

    #[test]
    fn test_github_token_is_a_secret_reference() {
        let action = source(&SourceRepository::github("acme", "infra", "github-token"));
        assert_eq!(
            action.config_str("OAuthToken"),
            Some("{{resolve:secretsmanager:github-token}}")
        );
        assert_eq!(
            action.config("PollForSourceChanges"),
            Some(&serde_json::Value::Bool(false))
        );
    }

    #[test]
    fn test_s3_polls_by_default() {
        let action = source(&SourceRepository::s3("drops", "app.zip"));
        assert_eq!(action.provider, "S3");
        assert_eq!(
            action.config("PollForSourceChanges"),
            Some(&serde_json::Value::Bool(true))
        );
    }
}
