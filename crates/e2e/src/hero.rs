//! Superhero fixtures as exchanged with the REST service

use serde::{Deserialize, Serialize};

/// A hero record as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub main_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Hero {
    /// Whether the hero was created by a run using `prefix`
    pub fn is_marked(&self, prefix: &str) -> bool {
        self.full_name.as_deref().is_some_and(|name| name.contains(prefix))
    }
}

/// Request body for create and update calls.
///
/// Absent fields are left out of the JSON entirely, which is how the
/// missing-name negative case is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroDraft {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_skill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl HeroDraft {
    /// Build a draft from literal case parameters.
    ///
    /// A non-empty `full_name` gets `prefix` prepended so an empty name stays
    /// empty on the wire. An empty `phone` means no phone.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        prefix: &str,
        id: i64,
        full_name: &str,
        gender: &str,
        birth_date: &str,
        city: &str,
        main_skill: &str,
        phone: &str,
    ) -> Self {
        Self {
            id,
            full_name: Some(if full_name.is_empty() {
                String::new()
            } else {
                format!("{prefix}{full_name}")
            }),
            gender: Some(gender.to_string()),
            birth_date: Some(birth_date.to_string()),
            city: Some(city.to_string()),
            main_skill: Some(main_skill.to_string()),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        }
    }

    /// The default positive fixture used by the lifecycle cases
    pub fn standard(prefix: &str) -> Self {
        Self::new(prefix, 900, "AutoTestMan", "M", "2019-01-01", "BugLand", "ForcedDebug", "911")
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }

    pub fn without_full_name(mut self) -> Self {
        self.full_name = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_prefixes_name_and_drops_empty_phone() {
        let draft = HeroDraft::new("Autotest_", 900, "Debugger2", "F", "2019-01-01", "BugLand2", "Review2", "");
        assert_eq!(draft.full_name.as_deref(), Some("Autotest_Debugger2"));
        assert_eq!(draft.phone, None);

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["fullName"], "Autotest_Debugger2");
        assert_eq!(json["mainSkill"], "Review2");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn empty_name_is_not_prefixed() {
        let draft = HeroDraft::new("Autotest_", 900, "", "M", "2019-01-01", "BugLand", "Debug", "911");
        assert_eq!(draft.full_name.as_deref(), Some(""));
        assert_eq!(draft.phone.as_deref(), Some("911"));
    }

    #[test]
    fn missing_name_is_omitted_from_body() {
        let draft = HeroDraft::standard("Autotest_").without_full_name();
        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("fullName").is_none());
        assert_eq!(json["id"], 900);
    }

    #[test]
    fn hero_tolerates_sparse_records() {
        let hero: Hero = serde_json::from_str(r#"{"id": 7, "fullName": "Autotest_X"}"#).unwrap();
        assert_eq!(hero.id, 7);
        assert!(hero.is_marked("Autotest_"));

        let unnamed: Hero = serde_json::from_str(r#"{"id": 8}"#).unwrap();
        assert!(!unnamed.is_marked("Autotest_"));
    }
}
