use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type EmployeeId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    /// Login handle for employee self-service, `[a-z0-9-]+`
    pub slug: String,
    pub full_name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Body of `POST /employees`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    pub slug: String,
    pub full_name: String,
    pub active: bool,
}

/// Body of `PUT /employees/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEmployeeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmployeeValidationError {
    #[error("Le nom complet est obligatoire")]
    EmptyName,
    #[error("L'identifiant est obligatoire")]
    EmptySlug,
    #[error("L'identifiant ne peut contenir que des minuscules, chiffres et tirets")]
    InvalidSlugCharacters,
    #[error("L'identifiant ne peut pas commencer ou finir par un tiret")]
    SlugEdgeHyphen,
}

pub fn validate_slug(slug: &str) -> Result<(), EmployeeValidationError> {
    if slug.is_empty() {
        return Err(EmployeeValidationError::EmptySlug);
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(EmployeeValidationError::InvalidSlugCharacters);
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(EmployeeValidationError::SlugEdgeHyphen);
    }
    Ok(())
}

/// Suggested slug for a full name: `"Élodie Martin"` becomes `"elodie-martin"`
pub fn slugify(full_name: &str) -> String {
    let mut slug = String::with_capacity(full_name.len());
    let mut pending_hyphen = false;

    for c in full_name.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c);
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' => 'a',
        'ç' => 'c',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' | 'í' | 'ì' => 'i',
        'ô' | 'ö' | 'ó' | 'ò' | 'õ' => 'o',
        'ù' | 'û' | 'ü' | 'ú' => 'u',
        'ÿ' => 'y',
        'ñ' => 'n',
        other => other,
    }
}

/// Validate the employee form and build the creation payload
pub fn validate_employee_form(
    full_name: &str,
    slug: &str,
    active: bool,
) -> Result<CreateEmployeeRequest, Vec<EmployeeValidationError>> {
    let mut errors = Vec::new();
    let full_name = full_name.trim();
    let slug = slug.trim();

    if full_name.is_empty() {
        errors.push(EmployeeValidationError::EmptyName);
    }
    if let Err(e) = validate_slug(slug) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(CreateEmployeeRequest {
            slug: slug.to_string(),
            full_name: full_name.to_string(),
            active,
        })
    } else {
        Err(errors)
    }
}

impl CreateEmployeeRequest {
    /// Changes needed to turn `employee` into this form's values
    pub fn diff(&self, employee: &Employee) -> UpdateEmployeeRequest {
        UpdateEmployeeRequest {
            slug: (self.slug != employee.slug).then(|| self.slug.clone()),
            full_name: (self.full_name != employee.full_name).then(|| self.full_name.clone()),
            active: (self.active != employee.active).then_some(self.active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("marie-2").is_ok());
        assert_eq!(validate_slug(""), Err(EmployeeValidationError::EmptySlug));
        assert_eq!(
            validate_slug("Marie"),
            Err(EmployeeValidationError::InvalidSlugCharacters)
        );
        assert_eq!(
            validate_slug("marie dupont"),
            Err(EmployeeValidationError::InvalidSlugCharacters)
        );
        assert_eq!(validate_slug("-marie"), Err(EmployeeValidationError::SlugEdgeHyphen));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Élodie Martin"), "elodie-martin");
        assert_eq!(slugify("  Jean--Luc  O'Brien "), "jean-luc-o-brien");
        assert_eq!(slugify("François 2"), "francois-2");
        assert_eq!(slugify("!!!"), "");
        assert!(validate_slug(&slugify("Chloé Dubois-Léger")).is_ok());
    }

    #[test]
    fn test_employee_form() {
        let request = validate_employee_form(" Paul Petit ", "paul", true).unwrap();
        assert_eq!(request.full_name, "Paul Petit");

        let errors = validate_employee_form("", "Bad Slug", true).unwrap_err();
        assert_eq!(
            errors,
            vec![
                EmployeeValidationError::EmptyName,
                EmployeeValidationError::InvalidSlugCharacters
            ]
        );
    }

    #[test]
    fn test_diff() {
        let employee = Employee {
            id: 1,
            slug: "paul".to_string(),
            full_name: "Paul".to_string(),
            active: true,
        };
        let request = validate_employee_form("Paul", "paul", false).unwrap();
        assert_eq!(
            request.diff(&employee),
            UpdateEmployeeRequest {
                active: Some(false),
                ..UpdateEmployeeRequest::default()
            }
        );
    }

    #[test]
    fn test_active_defaults_to_true() {
        let employee: Employee =
            serde_json::from_str(r#"{"id": 2, "slug": "ana", "full_name": "Ana"}"#).unwrap();
        assert!(employee.active);
    }
}
