//! Pet store fixtures: payload types, status checks and the assembly of the
//! positive and negative suites into runnable test units.

pub mod negative;
pub mod positive;

use std::rc::Rc;

use anyhow::{bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{Config, SuiteSelection};
use crate::test_context::{ApiResponse, TestCtx};
use crate::test_unit::TestUnit;

/// Pet availability as understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

impl PetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Sold => "sold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A well-formed pet payload. Malformed payloads are built with `json!`
/// or as raw strings by the negative suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo_urls: Vec<String>,
}

impl Pet {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Pet {
            id,
            name: name.into(),
            status: None,
            category: None,
            tags: Vec::new(),
            photo_urls: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: PetStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_category(mut self, id: i64, name: impl Into<String>) -> Self {
        self.category = Some(Category { id, name: name.into() });
        self
    }

    pub fn with_tag(mut self, id: i64, name: impl Into<String>) -> Self {
        self.tags.push(Tag { id, name: name.into() });
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_urls.push(url.into());
        self
    }
}

/// Fails the unit unless the response carries `expected`.
pub fn expect_status(response: &ApiResponse, expected: u16, message: &str) -> Result<()> {
    if response.status != expected {
        bail!("{}: expected status {}, got {}", message, expected, response.status);
    }
    Ok(())
}

/// Logs whether the response carries `expected` without failing the unit.
/// Returns true when it matched.
pub fn note_status(response: &ApiResponse, expected: u16, matched: &str) -> bool {
    if response.status == expected {
        info!(status = response.status, "{}", matched);
        true
    } else {
        warn!(expected, status = response.status, "unexpected status");
        false
    }
}

/// Logs the body, as JSON when it parses.
pub fn log_body(response: &ApiResponse) {
    match response.json() {
        Ok(json) => info!(status = response.status, "response: {}", json),
        Err(_) => info!(status = response.status, "response: {}", response.body),
    }
}

/// Wraps a fixture into a unit, sharing the run context.
pub(crate) fn unit<F>(ctx: &Rc<TestCtx>, name: &str, action: F) -> TestUnit
where
    F: FnOnce(&TestCtx) -> Result<()> + 'static,
{
    let ctx = Rc::clone(ctx);
    TestUnit::new(name, move || action(&ctx))
}

/// Assembles the units selected by the configuration, in suite order
/// (positive first when both are selected), then applies the name filter.
pub fn build_units(config: &Config, ctx: &Rc<TestCtx>) -> Result<Vec<TestUnit>> {
    let mut units = Vec::new();
    if matches!(config.suite, SuiteSelection::All | SuiteSelection::Positive) {
        units.extend(positive::units(ctx, config));
    }
    if matches!(config.suite, SuiteSelection::All | SuiteSelection::Negative) {
        units.extend(negative::units(ctx, config));
    }

    let units = match config.filter_regex()? {
        Some(re) => filter_units(units, &re),
        None => units,
    };
    Ok(units)
}

pub fn filter_units(units: Vec<TestUnit>, re: &Regex) -> Vec<TestUnit> {
    units.into_iter().filter(|unit| re.is_match(unit.name())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16) -> ApiResponse {
        ApiResponse {
            status,
            body: String::from("{}"),
        }
    }

    fn test_ctx() -> Rc<TestCtx> {
        Rc::new(TestCtx::new(&Config::default()).unwrap())
    }

    #[test]
    fn test_pet_serializes_in_store_shape() {
        let pet = Pet::new(12345, "Tommy")
            .with_status(PetStatus::Available)
            .with_category(1, "dog")
            .with_tag(1, "friendly");
        let value = serde_json::to_value(&pet).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 12345,
                "name": "Tommy",
                "status": "available",
                "category": {"id": 1, "name": "dog"},
                "tags": [{"id": 1, "name": "friendly"}]
            })
        );
    }

    #[test]
    fn test_pet_photo_urls_are_camel_case() {
        let pet = Pet::new(1, "Rex").with_photo_url("http://example.com/photo.jpg");
        let value = serde_json::to_value(&pet).unwrap();
        assert_eq!(value["photoUrls"], json!(["http://example.com/photo.jpg"]));
    }

    #[test]
    fn test_pet_deserializes_store_response() {
        let body = r#"{"id":2222,"category":{"id":2,"name":"cat"},"name":"Whiskers","photoUrls":[],"tags":[{"id":2,"name":"cute"}],"status":"pending"}"#;
        let pet: Pet = serde_json::from_str(body).unwrap();
        assert_eq!(pet.name, "Whiskers");
        assert_eq!(pet.status, Some(PetStatus::Pending));
        assert_eq!(pet.tags.len(), 1);
    }

    #[test]
    fn test_pet_status_strings() {
        assert_eq!(PetStatus::Available.as_str(), "available");
        assert_eq!(PetStatus::Sold.as_str(), "sold");
        assert_eq!(serde_json::to_value(PetStatus::Pending).unwrap(), json!("pending"));
    }

    #[test]
    fn test_expect_status() {
        assert!(expect_status(&response(200), 200, "create").is_ok());
        let err = expect_status(&response(500), 200, "Failed to create pet with ID 1111").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create pet with ID 1111: expected status 200, got 500"
        );
    }

    #[test]
    fn test_note_status_never_fails() {
        assert!(note_status(&response(404), 404, "Pet not found!"));
        assert!(!note_status(&response(200), 404, "Pet not found!"));
    }

    #[test]
    fn test_build_units_respects_suite_selection() {
        let ctx = test_ctx();
        let all = build_units(&Config::default(), &ctx).unwrap();
        let positive = build_units(
            &Config {
                suite: SuiteSelection::Positive,
                ..Config::default()
            },
            &ctx,
        )
        .unwrap();
        let negative = build_units(
            &Config {
                suite: SuiteSelection::Negative,
                ..Config::default()
            },
            &ctx,
        )
        .unwrap();

        assert_eq!(positive.len(), 16);
        assert_eq!(negative.len(), 35);
        assert_eq!(all.len(), positive.len() + negative.len());
        assert_eq!(all[0].name(), "create_pet");
        assert_eq!(all[16].name(), "get_pet_with_large_id");
    }

    #[test]
    fn test_build_units_applies_filter() {
        let ctx = test_ctx();
        let config = Config {
            filter: Some(String::from("^upload_pet_image")),
            ..Config::default()
        };
        let names: Vec<String> = build_units(&config, &ctx)
            .unwrap()
            .iter()
            .map(|u| u.name().to_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "upload_pet_image",
                "upload_pet_image_invalid_pet_id",
                "upload_pet_image_invalid_file_path",
                "upload_pet_image_unsupported_file",
                "upload_pet_image_large_file",
            ]
        );
    }

    #[test]
    fn test_unit_names_are_valid() {
        let ctx = test_ctx();
        let units = build_units(&Config::default(), &ctx).unwrap();
        assert!(units.iter().all(|u| !u.name().trim().is_empty()));
    }
}
