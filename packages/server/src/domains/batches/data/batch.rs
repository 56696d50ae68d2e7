use serde::Deserialize;

use crate::domains::batches::url_list::is_valid_url;

/// Request body for creating a batch.
///
/// Every field is optional at the serde level so that missing pieces are
/// reported by [`CreateBatchInput::validate`] with a readable message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchInput {
    pub batch_name: Option<String>,
    pub old_urls: Option<Vec<String>>,
    pub new_urls: Option<Vec<String>>,
}

/// A batch that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBatch {
    pub name: String,
    pub old_urls: Vec<String>,
    pub new_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("batchName is required")]
    MissingName,
    #[error("{0} must be a non-empty array")]
    EmptyList(&'static str),
    #[error("{field} contains an invalid URL: {url}")]
    InvalidUrl { field: &'static str, url: String },
}

impl CreateBatchInput {
    pub fn validate(self) -> Result<NewBatch, ValidationError> {
        let name = self
            .batch_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::MissingName)?;

        Ok(NewBatch {
            name,
            old_urls: check_list("oldUrls", self.old_urls)?,
            new_urls: check_list("newUrls", self.new_urls)?,
        })
    }
}

fn check_list(field: &'static str, urls: Option<Vec<String>>) -> Result<Vec<String>, ValidationError> {
    let urls: Vec<String> = urls
        .unwrap_or_default()
        .into_iter()
        .map(|u| u.trim().to_string())
        .collect();

    if urls.is_empty() {
        return Err(ValidationError::EmptyList(field));
    }
    if let Some(bad) = urls.iter().find(|u| !is_valid_url(u)) {
        return Err(ValidationError::InvalidUrl {
            field,
            url: bad.clone(),
        });
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, old: &[&str], new: &[&str]) -> CreateBatchInput {
        CreateBatchInput {
            batch_name: Some(name.to_string()),
            old_urls: Some(old.iter().map(|s| s.to_string()).collect()),
            new_urls: Some(new.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_valid_input_is_trimmed() {
        let batch = input(" relaunch ", &[" https://a.com/old "], &["https://b.com/new"])
            .validate()
            .unwrap();

        assert_eq!(batch.name, "relaunch");
        assert_eq!(batch.old_urls, vec!["https://a.com/old"]);
    }

    #[test]
    fn test_rejects_missing_name_and_empty_lists() {
        assert_eq!(
            input("  ", &["https://a.com/x"], &["https://b.com/y"]).validate(),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            input("x", &[], &["https://b.com/y"]).validate(),
            Err(ValidationError::EmptyList("oldUrls"))
        );
        assert_eq!(
            CreateBatchInput {
                batch_name: Some("x".into()),
                old_urls: Some(vec!["https://a.com/x".into()]),
                new_urls: None,
            }
            .validate(),
            Err(ValidationError::EmptyList("newUrls"))
        );
    }

    #[test]
    fn test_rejects_non_url_entries() {
        let err = input("x", &["https://a.com/x"], &["not a url"])
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUrl { field: "newUrls", .. }));
    }

    #[test]
    fn test_deserializes_camel_case_body() {
        let parsed: CreateBatchInput = serde_json::from_str(
            r#"{"batchName":"b","oldUrls":["https://a.com/x"],"newUrls":["https://b.com/y"]}"#,
        )
        .unwrap();
        assert_eq!(parsed.batch_name.as_deref(), Some("b"));
        assert!(parsed.validate().is_ok());
    }
}
