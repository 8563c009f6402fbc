//! Rendering of invocation results into their final textual form.
//!
//! Two modes exist: pretty-printed JSON of the whole result map, and a text
//! mode driven by the reserved `formatString` key, whose `{{.key}}`
//! placeholders are substituted with the corresponding result values.

use crate::error::{CallError, CallResult};
use crate::types::{ResultMap, FORMAT_STRING_KEY};
use serde_json::Value as JsonValue;

/// Recognized output modes. Anything that is not `json` renders as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Text,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Render a result map in the requested mode.
///
/// JSON mode pretty-prints with 2-space indentation and a trailing newline.
/// Text mode requires the `formatString` key and substitutes its
/// placeholders; absent keys render as `<no value>`.
pub fn render(res: &ResultMap, format: OutputFormat) -> CallResult<String> {
    match format {
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(res)?;
            Ok(format!("{out}\n"))
        }
        OutputFormat::Text => {
            let template = res.get(FORMAT_STRING_KEY).ok_or(CallError::MissingFormatString)?;
            Ok(render_template(&display_value(template), res))
        }
    }
}

/// Field-substitution templating: `{{.key}}` (interior whitespace allowed) is
/// replaced by the value under `key`. Placeholders that are not field lookups
/// are reproduced verbatim.
fn render_template(template: &str, res: &ResultMap) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let token = after[..end].trim();
        match token.strip_prefix('.') {
            Some(key) => match res.get(key) {
                Some(value) => out.push_str(&display_value(value)),
                None => out.push_str("<no value>"),
            },
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
