use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Regex for URL-safe slugs
    /// Must be lowercase alphanumeric segments joined by single hyphens
    /// - Valid: "cong-nghe", "ai", "quy-trinh-2024"
    /// - Invalid: "-ai", "ai-", "cong--nghe", "Cong", "cong_nghe"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for hex colors in `#RGB` or `#RRGGBB` form
    pub static ref HEX_COLOR_REGEX: Regex =
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap();
}

/// Reject strings that are empty once surrounding whitespace is removed
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be empty".into());
        return Err(error);
    }
    Ok(())
}

/// `meta_description` -> `metaDescription`, matching the JSON field names
pub fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("{} {}", field, message);
    }

    let param = |key: &str| error.params.get(key).map(|v| v.to_string());
    match error.code.as_ref() {
        "length" => match param("max") {
            Some(max) => format!("{} must be at most {} characters", field, max),
            None => format!("{} has an invalid length", field),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("{} must be between {} and {}", field, min, max),
            _ => format!("{} is out of range", field),
        },
        "url" => format!("{} must be a valid URL", field),
        _ => format!("{} is invalid", field),
    }
}

/// First failing field of a validator report, as `(field, message)` with
/// the field in its JSON spelling. Fields are visited alphabetically so the
/// reported error is deterministic.
pub fn first_field_error(errors: &validator::ValidationErrors) -> (String, String) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            let field = to_camel_case(&field);
            errs.first().map(|err| {
                let message = describe(&field, err);
                (field, message)
            })
        })
        .unwrap_or_else(|| (String::new(), errors.to_string()))
}
