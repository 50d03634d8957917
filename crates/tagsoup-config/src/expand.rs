//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Bare `$VAR` is kept literally, even next to a `${VAR}` reference. An
/// unset variable without a default is an error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let escaped = escape_bare_dollars(value);
    shellexpand::env_with_context(escaped.as_str(), |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

struct UnsetVar(String);

/// Double every `$` that does not open `${`; shellexpand reads `$$` as `$`.
fn escape_bare_dollars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '$' && chars.peek() != Some(&'{') {
            out.push('$');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: no other test touches this variable
        unsafe {
            std::env::remove_var("TAGSOUP_UNSET_WIDTH");
        }
        let result = expand_env("${TAGSOUP_UNSET_WIDTH:-480}", "render.width").unwrap();
        assert_eq!(result, "480");
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: no other test touches this variable
        unsafe {
            std::env::set_var("TAGSOUP_FORMULA_HOST", "formula.example.com");
        }
        let result = expand_env("https://${TAGSOUP_FORMULA_HOST}/render", "formula.service_url")
            .unwrap();
        assert_eq!(result, "https://formula.example.com/render");
        unsafe {
            std::env::remove_var("TAGSOUP_FORMULA_HOST");
        }
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: no other test touches this variable
        unsafe {
            std::env::remove_var("TAGSOUP_MISSING");
        }
        let err = expand_env("${TAGSOUP_MISSING}", "mentions.profile_url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("TAGSOUP_MISSING"));
        assert!(msg.contains("mentions.profile_url"));
    }

    #[test]
    fn test_placeholders_and_bare_dollar_unchanged() {
        assert_eq!(
            expand_env("/people/{nickname}/", "mentions.profile_url").unwrap(),
            "/people/{nickname}/"
        );
        assert_eq!(expand_env("/a/$b", "x").unwrap(), "/a/$b");
    }

    #[test]
    fn test_bare_dollar_kept_next_to_reference() {
        // SAFETY: no other test touches these variables
        unsafe {
            std::env::remove_var("TAGSOUP_UNSET_ROOT");
            std::env::remove_var("TAGSOUP_UNSET_LEAF");
        }
        let result = expand_env(
            "${TAGSOUP_UNSET_ROOT:-/srv}/$TAGSOUP_UNSET_LEAF/$",
            "cache.dir",
        )
        .unwrap();
        assert_eq!(result, "/srv/$TAGSOUP_UNSET_LEAF/$");
    }
}
