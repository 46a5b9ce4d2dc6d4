use serde::{Deserialize, Serialize};

use crate::services::accounts::{ProfileEdit, Signup};

const MIN_PASSWORD_LEN: usize = 6;

/// A validation failure tied to one form field
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn required(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "This field is required."));
    }
}

fn valid_email(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, "This field is required."));
        return;
    }

    let well_formed = value
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        })
        .unwrap_or(false);

    if !well_formed {
        errors.push(FieldError::new(field, "Invalid email address."));
    }
}

fn min_length(field: &'static str, value: &str, min: usize, errors: &mut Vec<FieldError>) {
    if value.chars().count() < min {
        errors.push(FieldError::new(
            field,
            format!("Field must be at least {} characters long.", min),
        ));
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SignupForm {
    pub fn validate(self) -> Result<Signup, Vec<FieldError>> {
        let mut errors = Vec::new();
        required("username", &self.username, &mut errors);
        valid_email("email", &self.email, &mut errors);
        min_length("password", &self.password, MIN_PASSWORD_LEN, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Signup {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            image_url: optional(self.image_url),
        })
    }

    /// Submitted values safe to echo back, without the password
    pub fn echo(&self) -> FormEcho {
        FormEcho {
            username: self.username.clone(),
            email: self.email.clone(),
            image_url: self.image_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        required("username", &self.username, &mut errors);
        min_length("password", &self.password, MIN_PASSWORD_LEN, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Profile edit form; repeated `service` fields carry subscribed service ids
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub password: String,
    pub service_ids: Vec<i32>,
}

impl ProfileForm {
    /// Builds the form from raw urlencoded pairs. Unparseable service ids are skipped.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "username" => form.username = value,
                "email" => form.email = value,
                "image_url" => form.image_url = Some(value),
                "password" => form.password = value,
                "service" => {
                    if let Ok(id) = value.trim().parse::<i32>() {
                        if !form.service_ids.contains(&id) {
                            form.service_ids.push(id);
                        }
                    }
                }
                _ => {}
            }
        }
        form
    }

    pub fn validate(self) -> Result<ProfileEdit, Vec<FieldError>> {
        let mut errors = Vec::new();
        required("username", &self.username, &mut errors);
        valid_email("email", &self.email, &mut errors);
        min_length("password", &self.password, MIN_PASSWORD_LEN, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProfileEdit {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            image_url: optional(self.image_url),
            password: self.password,
            service_ids: self.service_ids,
        })
    }
}

/// Submitted account fields echoed back into a re-rendered form
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FormEcho {
    pub username: String,
    pub email: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LikeForm {
    /// JSON movie descriptor as rendered on the search page
    #[serde(default)]
    pub movie: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_signup_validation_collects_all_errors() {
        let form = SignupForm {
            username: " ".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            image_url: None,
        };

        let errors = form.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["username", "email", "password"]);
    }

    #[test]
    fn test_signup_validation_normalizes() {
        let form = SignupForm {
            username: " alice ".to_string(),
            email: "alice@example.com".to_string(),
            password: "hunter22".to_string(),
            image_url: Some("  ".to_string()),
        };

        let signup = form.validate().unwrap();
        assert_eq!(signup.username, "alice");
        assert_eq!(signup.image_url, None);
    }

    #[test]
    fn test_email_shapes() {
        for good in ["a@b.co", "first.last@mail.example.org"] {
            let mut errors = Vec::new();
            valid_email("email", good, &mut errors);
            assert!(errors.is_empty(), "{} should be valid", good);
        }
        for bad in ["@b.co", "a@", "a@b", "a@@b.co", "a@.co", "a@b."] {
            let mut errors = Vec::new();
            valid_email("email", bad, &mut errors);
            assert_eq!(errors.len(), 1, "{} should be invalid", bad);
        }
    }

    #[test]
    fn test_login_validation() {
        let form = LoginForm {
            username: "alice".to_string(),
            password: "12345".to_string(),
        };
        assert_eq!(form.validate().unwrap_err()[0].field, "password");
    }

    #[test]
    fn test_profile_form_from_pairs() {
        let form = ProfileForm::from_pairs(pairs(&[
            ("username", "alice"),
            ("email", "alice@example.com"),
            ("password", "hunter22"),
            ("service", "2"),
            ("service", "5"),
            ("service", "2"),
            ("service", "netflix"),
            ("csrf", "ignored"),
        ]));

        assert_eq!(form.service_ids, vec![2, 5]);
        let edit = form.validate().unwrap();
        assert_eq!(edit.username, "alice");
        assert_eq!(edit.service_ids, vec![2, 5]);
    }

    #[test]
    fn test_profile_form_without_services() {
        let form = ProfileForm::from_pairs(pairs(&[("username", "alice")]));
        assert!(form.service_ids.is_empty());
        assert!(form.validate().is_err());
    }
}
