//! Field-name translation between model and wire spellings.
//!
//! Only object keys are rewritten; string values pass through untouched.

use serde_json::{Map, Value};

/// Converts a snake_case name to lower camelCase.
///
/// Leading underscores are kept; repeated and trailing underscores are
/// dropped.
///
/// # Examples
///
/// ```
/// use convoy::message::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("earliest_time"), "earliestTime");
/// assert_eq!(to_camel_case("status"), "status");
/// ```
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    let body = name.trim_start_matches('_');
    let mut camel = "_".repeat(name.len() - body.len());
    let words = body.split('_').filter(|word| !word.is_empty());
    for (index, word) in words.enumerate() {
        if index == 0 {
            camel.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            camel.extend(first.to_uppercase());
            camel.push_str(chars.as_str());
        }
    }
    camel
}

/// Converts a camelCase or PascalCase name to snake_case.
///
/// Acronym runs stay together (`HTTPServer` becomes `http_server`) and
/// hyphens become underscores.
///
/// # Examples
///
/// ```
/// use convoy::message::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("receiverIds"), "receiver_ids");
/// assert_eq!(to_snake_case("task_id"), "task_id");
/// ```
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut snake = String::with_capacity(name.len() + 4);
    for (index, &ch) in chars.iter().enumerate() {
        let previous = index.checked_sub(1).and_then(|at| chars.get(at)).copied();
        let next = chars.get(index + 1).copied();
        if ch.is_uppercase() {
            let after_word = previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            let ends_acronym = previous.is_some_and(char::is_uppercase)
                && next.is_some_and(char::is_lowercase);
            if after_word || ends_acronym {
                snake.push('_');
            }
            snake.extend(ch.to_lowercase());
        } else if ch == '-' {
            snake.push('_');
        } else {
            snake.push(ch);
        }
    }
    snake
}

/// Rewrites every object key in `value` to camelCase, descending into
/// nested objects and arrays.
#[must_use]
pub fn camelize_keys(value: Value) -> Value {
    rename_keys(value, &to_camel_case)
}

/// Rewrites every object key in `value` to snake_case, descending into
/// nested objects and arrays.
#[must_use]
pub fn underscore_keys(value: Value) -> Value {
    rename_keys(value, &to_snake_case)
}

fn rename_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, nested)| (rename(&key), rename_keys(nested, rename)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rename_keys(item, rename))
                .collect(),
        ),
        scalar => scalar,
    }
}
