//! `{placeholder}` substitution for host and service name templates.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Macro for creating static regex patterns with consistent error messages.
///
/// Patterns in this module are constants; a compile failure is a bug in the operator.
macro_rules! static_regex {
    ($pattern:expr, $name:expr) => {
        Regex::new($pattern).unwrap_or_else(|_| {
            panic!(
                "Static regex '{}' failed to compile - this is a bug in the operator",
                $name
            )
        })
    };
}

/// Matches `{name}` placeholders.
static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| static_regex!(r"\{([^{}]*)\}", "PLACEHOLDER_PATTERN"));

/// Listener names: a letter, then letters, digits or hyphens, not ending in a hyphen.
static LISTENER_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    static_regex!(
        r"^[A-Za-z]([A-Za-z0-9-]*[A-Za-z0-9])?$",
        "LISTENER_NAME_PATTERN"
    )
});

/// Longest listener name whose `tcp-` service port name is still a DNS-1123 label.
pub const MAX_LISTENER_NAME_LEN: usize = 63 - "tcp-".len();

/// Whether `name` can be used as a Kafka listener name and as a Service port name.
pub fn is_valid_listener_name(name: &str) -> bool {
    name.len() <= MAX_LISTENER_NAME_LEN && LISTENER_NAME_PATTERN.is_match(name)
}

/// Placeholders accepted in external zone host templates.
pub const ZONE_HOST_PLACEHOLDERS: &[&str] = &["zone", "brokerId", "clusterName", "namespace"];

/// Placeholders accepted in the headless service name template.
pub const SERVICE_NAME_PLACEHOLDERS: &[&str] = &["clusterName", "namespace"];

/// Check that `template` is non-empty, has balanced braces and only uses `allowed` placeholders.
pub fn validate(template: &str, allowed: &[&str]) -> Result<(), String> {
    if template.trim().is_empty() {
        return Err("template is empty".to_string());
    }

    for caps in PLACEHOLDER_PATTERN.captures_iter(template) {
        let name = &caps[1];
        if !allowed.contains(&name) {
            return Err(format!("unknown placeholder `{{{}}}`", name));
        }
    }

    let remainder = PLACEHOLDER_PATTERN.replace_all(template, "");
    if remainder.contains(['{', '}']) {
        return Err("unbalanced brace".to_string());
    }

    Ok(())
}

/// Substitute placeholders. Placeholders missing from `vars` are left untouched.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
