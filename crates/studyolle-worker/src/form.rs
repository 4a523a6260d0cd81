//! Request forms and their field constraints.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validator::Errors;

static NICKNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ㄱ-ㅎ가-힣a-z0-9_-]{3,20}$").expect("nickname pattern"));
static STUDY_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ㄱ-ㅎ가-힣a-z0-9_-]{2,20}$").expect("study path pattern"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*$").expect("email pattern")
});

/// Decoded `application/x-www-form-urlencoded` body or query string.
#[derive(Debug, Default, Clone)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn parse(encoded: &str) -> Self {
        Self(
            url::form_urlencoded::parse(encoded.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Missing fields bind as empty strings.
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    /// Empty fields bind as `None`.
    pub fn optional(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// Checkbox semantics: absent means false.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("true" | "on" | "1" | "yes"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Field-level constraints that need no database access.
pub trait Validate {
    fn validate(&self, errors: &mut Errors);
}

fn not_blank(errors: &mut Errors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.reject(field, "NotBlank", "must not be blank");
    }
}

fn length(errors: &mut Errors, field: &'static str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.reject(
            field,
            "Length",
            format!("length must be between {min} and {max}"),
        );
    }
}

fn max_length(errors: &mut Errors, field: &'static str, value: Option<&str>, max: usize) {
    if let Some(v) = value {
        length(errors, field, v, 0, max);
    }
}

fn pattern(errors: &mut Errors, field: &'static str, value: &str, re: &Regex) {
    if !re.is_match(value) {
        errors.reject(field, "Pattern", "has an invalid format");
    }
}

pub fn is_valid_study_path(path: &str) -> bool {
    STUDY_PATH.is_match(path)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpForm {
    pub nickname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl SignUpForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            nickname: fields.text("nickname"),
            email: fields.text("email"),
            password: fields.text("password"),
        }
    }
}

impl Validate for SignUpForm {
    fn validate(&self, errors: &mut Errors) {
        not_blank(errors, "nickname", &self.nickname);
        length(errors, "nickname", &self.nickname, 3, 20);
        pattern(errors, "nickname", &self.nickname, &NICKNAME);

        not_blank(errors, "email", &self.email);
        if !EMAIL.is_match(&self.email) {
            errors.reject("email", "Email", "must be a well-formed email address");
        }

        not_blank(errors, "password", &self.password);
        length(errors, "password", &self.password, 8, 50);
    }
}

/// Form login. `username` may be an email or a nickname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl LoginForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            username: fields.text("username"),
            password: fields.text("password"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub bio: Option<String>,
    pub url: Option<String>,
    pub occupation: Option<String>,
    pub location: Option<String>,
    pub profile_image: Option<String>,
}

impl Profile {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            bio: fields.optional("bio"),
            url: fields.optional("url"),
            occupation: fields.optional("occupation"),
            location: fields.optional("location"),
            profile_image: fields.optional("profileImage"),
        }
    }

    pub fn of(account: &entity::account::Model) -> Self {
        Self {
            bio: account.bio.clone(),
            url: account.url.clone(),
            occupation: account.occupation.clone(),
            location: account.location.clone(),
            profile_image: account.profile_image.clone(),
        }
    }
}

impl Validate for Profile {
    fn validate(&self, errors: &mut Errors) {
        max_length(errors, "bio", self.bio.as_deref(), 30);
        max_length(errors, "url", self.url.as_deref(), 50);
        max_length(errors, "occupation", self.occupation.as_deref(), 50);
        max_length(errors, "location", self.location.as_deref(), 50);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordForm {
    #[serde(skip_serializing)]
    pub new_password: String,
    #[serde(skip_serializing)]
    pub new_password_confirm: String,
}

impl PasswordForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            new_password: fields.text("newPassword"),
            new_password_confirm: fields.text("newPasswordConfirm"),
        }
    }
}

impl Validate for PasswordForm {
    fn validate(&self, errors: &mut Errors) {
        length(errors, "newPassword", &self.new_password, 8, 50);
        length(errors, "newPasswordConfirm", &self.new_password_confirm, 8, 50);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notifications {
    pub study_created_by_email: bool,
    pub study_created_by_web: bool,
    pub study_enrollment_result_by_email: bool,
    pub study_enrollment_result_by_web: bool,
    pub study_updated_by_email: bool,
    pub study_updated_by_web: bool,
}

impl Notifications {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            study_created_by_email: fields.flag("studyCreatedByEmail"),
            study_created_by_web: fields.flag("studyCreatedByWeb"),
            study_enrollment_result_by_email: fields.flag("studyEnrollmentResultByEmail"),
            study_enrollment_result_by_web: fields.flag("studyEnrollmentResultByWeb"),
            study_updated_by_email: fields.flag("studyUpdatedByEmail"),
            study_updated_by_web: fields.flag("studyUpdatedByWeb"),
        }
    }

    pub fn of(account: &entity::account::Model) -> Self {
        Self {
            study_created_by_email: account.study_created_by_email,
            study_created_by_web: account.study_created_by_web,
            study_enrollment_result_by_email: account.study_enrollment_result_by_email,
            study_enrollment_result_by_web: account.study_enrollment_result_by_web,
            study_updated_by_email: account.study_updated_by_email,
            study_updated_by_web: account.study_updated_by_web,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicknameForm {
    pub nickname: String,
}

impl NicknameForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            nickname: fields.text("nickname"),
        }
    }
}

impl Validate for NicknameForm {
    fn validate(&self, errors: &mut Errors) {
        not_blank(errors, "nickname", &self.nickname);
        length(errors, "nickname", &self.nickname, 3, 20);
        pattern(errors, "nickname", &self.nickname, &NICKNAME);
    }
}

/// JSON body of the tag add/remove endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagForm {
    pub tag_title: String,
}

/// JSON body of the zone add/remove endpoints, e.g. `Andong(안동시)/North Gyeongsang`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneForm {
    pub zone_name: String,
}

impl ZoneForm {
    pub fn city_name(&self) -> &str {
        self.zone_name
            .split_once('(')
            .map_or(self.zone_name.as_str(), |(city, _)| city)
            .trim()
    }

    pub fn province_name(&self) -> &str {
        self.zone_name
            .rsplit_once('/')
            .map_or("", |(_, province)| province)
            .trim()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyForm {
    pub path: String,
    pub title: String,
    pub short_description: String,
    pub full_description: String,
}

impl StudyForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            path: fields.text("path"),
            title: fields.text("title"),
            short_description: fields.text("shortDescription"),
            full_description: fields.text("fullDescription"),
        }
    }
}

impl Validate for StudyForm {
    fn validate(&self, errors: &mut Errors) {
        not_blank(errors, "path", &self.path);
        length(errors, "path", &self.path, 2, 20);
        pattern(errors, "path", &self.path, &STUDY_PATH);

        not_blank(errors, "title", &self.title);
        length(errors, "title", &self.title, 0, 50);

        StudyDescriptionForm {
            short_description: self.short_description.clone(),
            full_description: self.full_description.clone(),
        }
        .validate(errors);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDescriptionForm {
    pub short_description: String,
    pub full_description: String,
}

impl StudyDescriptionForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            short_description: fields.text("shortDescription"),
            full_description: fields.text("fullDescription"),
        }
    }

    pub fn of(study: &entity::study::Model) -> Self {
        Self {
            short_description: study.short_description.clone(),
            full_description: study.full_description.clone(),
        }
    }
}

impl Validate for StudyDescriptionForm {
    fn validate(&self, errors: &mut Errors) {
        not_blank(errors, "shortDescription", &self.short_description);
        length(errors, "shortDescription", &self.short_description, 0, 100);
        not_blank(errors, "fullDescription", &self.full_description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_of(form: &impl Validate) -> Errors {
        let mut errors = Errors::default();
        form.validate(&mut errors);
        errors
    }

    #[test]
    fn parses_urlencoded_fields() {
        let fields = FormFields::parse("nickname=oomi&email=a%40b.com&studyCreatedByWeb=on");
        assert_eq!(fields.text("nickname"), "oomi");
        assert_eq!(fields.text("email"), "a@b.com");
        assert_eq!(fields.text("missing"), "");
        assert!(fields.flag("studyCreatedByWeb"));
        assert!(!fields.flag("studyCreatedByEmail"));
    }

    #[test]
    fn sign_up_form_rejects_wrong_input() {
        let form = SignUpForm {
            nickname: "**oomi".to_string(),
            email: "whdudal1217.naver.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = errors_of(&form);
        assert!(errors.has_field_error("nickname"));
        assert!(errors.has_field_error("email"));
        assert!(errors.has_field_error("password"));
    }

    #[test]
    fn sign_up_form_accepts_korean_nickname() {
        let form = SignUpForm {
            nickname: "스터디_oomi".to_string(),
            email: "oomi@example.com".to_string(),
            password: "1234578910".to_string(),
        };
        assert!(!errors_of(&form).has_errors());
    }

    #[test]
    fn nickname_pattern_rejects_uppercase_and_bad_lengths() {
        for (nickname, valid) in [
            ("oomi", true),
            ("Oomi", false),
            ("oo", false),
            ("a-very-long-nickname-over-20", false),
        ] {
            let form = SignUpForm {
                nickname: nickname.to_string(),
                email: "oomi@example.com".to_string(),
                password: "1234578910".to_string(),
            };
            assert_eq!(errors_of(&form).has_field_error("nickname"), !valid, "{nickname}");
        }
    }

    #[test]
    fn profile_limits_bio_length() {
        let profile = Profile {
            bio: Some("x".repeat(31)),
            ..Profile::default()
        };
        let errors = errors_of(&profile);
        assert!(errors.has_field_error("bio"));
        assert!(!errors.has_field_error("url"));
    }

    #[test]
    fn study_form_checks_every_field() {
        let errors = errors_of(&StudyForm::default());
        for field in ["path", "title", "shortDescription", "fullDescription"] {
            assert!(errors.has_field_error(field), "{field}");
        }

        let ok = StudyForm {
            path: "spring-study".to_string(),
            title: "Spring".to_string(),
            short_description: "short".to_string(),
            full_description: "full".to_string(),
        };
        assert!(!errors_of(&ok).has_errors());
    }

    #[test]
    fn zone_form_splits_display_string() {
        let form = ZoneForm {
            zone_name: "Andong(안동시)/North Gyeongsang".to_string(),
        };
        assert_eq!(form.city_name(), "Andong");
        assert_eq!(form.province_name(), "North Gyeongsang");
    }
}
