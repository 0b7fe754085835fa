//! Branch-name and commit-message suggestions produced by the language model.

use serde::Deserialize;

/// Longest branch name the sanitiser will emit.
pub const MAX_BRANCH_NAME_LEN: usize = 60;

/// Validated suggestion returned to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSuggestion {
    /// Conventional commit message.
    pub commit_message: String,
    /// Git-safe branch name.
    pub branch_name: String,
}

/// Reasons a model reply cannot be turned into a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BranchSuggestionError {
    /// The reply held no parseable JSON object.
    #[error("model reply did not contain a JSON suggestion: {0}")]
    Malformed(String),
    /// The commit message was blank.
    #[error("model suggested an empty commit message")]
    EmptyCommitMessage,
    /// Nothing usable remained after sanitising the branch name.
    #[error("model suggested an unusable branch name")]
    EmptyBranchName,
}

#[derive(Deserialize)]
struct RawSuggestion {
    commit_message: String,
    branch_name: String,
}

impl BranchSuggestion {
    /// Parse the first JSON object found in a model reply.
    ///
    /// # Examples
    /// ```
    /// use hive_backend::domain::BranchSuggestion;
    ///
    /// let reply = "Sure!\n{\"commit_message\":\"feat: add login\",\"branch_name\":\"Feature/Add Login\"}";
    /// let suggestion = BranchSuggestion::from_model_reply(reply).unwrap();
    /// assert_eq!(suggestion.branch_name, "feature/add-login");
    /// ```
    pub fn from_model_reply(reply: &str) -> Result<Self, BranchSuggestionError> {
        let raw = first_json_object(reply)?;

        let commit_message = raw.commit_message.trim();
        if commit_message.is_empty() {
            return Err(BranchSuggestionError::EmptyCommitMessage);
        }
        let branch_name = sanitize_branch_name(&raw.branch_name);
        if branch_name.is_empty() {
            return Err(BranchSuggestionError::EmptyBranchName);
        }
        Ok(Self {
            commit_message: commit_message.to_owned(),
            branch_name,
        })
    }
}

/// Deserialise the first JSON value starting at the first `{`, ignoring
/// whatever text follows it.
fn first_json_object(reply: &str) -> Result<RawSuggestion, BranchSuggestionError> {
    let start = reply
        .find('{')
        .ok_or_else(|| BranchSuggestionError::Malformed("no JSON object found".to_owned()))?;
    serde_json::Deserializer::from_str(&reply[start..])
        .into_iter::<RawSuggestion>()
        .next()
        .ok_or_else(|| BranchSuggestionError::Malformed("no JSON object found".to_owned()))?
        .map_err(|err| BranchSuggestionError::Malformed(err.to_string()))
}

/// Normalise free text into a git-safe branch name.
pub fn sanitize_branch_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.trim().chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'a'..='z' | '0'..='9' | '/' => ch,
            '-' | '_' => '-',
            c if c.is_whitespace() => '-',
            _ => continue,
        };
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        if mapped == '/' && out.ends_with('/') {
            continue;
        }
        out.push(mapped);
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '/');
    let truncated: String = trimmed.chars().take(MAX_BRANCH_NAME_LEN).collect();
    truncated
        .trim_end_matches(|c| c == '-' || c == '/')
        .to_owned()
}
