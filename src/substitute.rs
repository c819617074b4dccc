//! Placeholder substitution for file names and contents.
//! Replaces `{{key}}` tokens with stringified variable values; tokens with
//! no matching variable are left verbatim.

use indexmap::IndexMap;

/// Ordered variable mapping used for placeholder substitution.
/// Only booleans, numbers and strings are meaningful as values.
pub type Variables = IndexMap<String, serde_json::Value>;

/// Stringifies a variable value the way it appears in generated output:
/// strings unquoted, everything else in its JSON form.
pub fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replaces every `{{key}}` occurrence in `input` with the variable's
/// stringified value. Keys are trimmed before the token is built, so
/// `"  name "` and `"name"` produce the same `{{name}}` token.
pub fn substitute(input: &str, variables: &Variables) -> String {
    let mut output = input.to_string();
    for (key, value) in variables {
        let token = format!("{{{{{}}}}}", key.trim());
        if output.contains(&token) {
            output = output.replace(&token, &value_to_string(value));
        }
    }
    output
}
