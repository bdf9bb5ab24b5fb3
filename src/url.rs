//! URL assembly from a path template and parameter declarations.

use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::definition::{ParameterKind, ParameterSpec};
use crate::error::Error;

/// Expands `path_template` against the declared `parameters` and the
/// supplied `args`, then joins the result onto the configured base.
///
/// Every declared path parameter must be present in `args`; a missing
/// one, or a placeholder left in the template after substitution, is a
/// configuration error naming the parameter. Query parameters are
/// appended in declaration order and silently skipped when absent.
pub fn build_url(
    config: &ClientConfig,
    path_template: &str,
    parameters: &[ParameterSpec],
    args: &Map<String, Value>,
) -> Result<String, Error> {
    let mut path = path_template.to_string();
    let mut query = Vec::new();

    for param in parameters {
        match param.kind {
            ParameterKind::Path => {
                let value = args.get(&param.name).ok_or_else(|| Error::MissingPathParameter {
                    name: param.name.clone(),
                })?;
                let encoded = urlencoding::encode(&render(value)).into_owned();
                path = path.replace(&format!("{{{}}}", param.name), &encoded);
            }
            ParameterKind::Query => {
                if let Some(value) = args.get(&param.name) {
                    query.push(format!(
                        "{}={}",
                        urlencoding::encode(&param.name),
                        urlencoding::encode(&render(value))
                    ));
                }
            }
        }
    }

    // A placeholder that survives substitution means the template names
    // a parameter the definition never declared.
    if let Some(name) = leftover_placeholder(&path) {
        return Err(Error::MissingPathParameter {
            name: name.to_string(),
        });
    }

    let mut url = join_base(config, &path);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }
    Ok(url)
}

/// Renders a parameter value for the URL: strings go in bare, anything
/// else uses its JSON text.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn leftover_placeholder(path: &str) -> Option<&str> {
    let open = path.find('{')?;
    let close = path[open..].find('}')?;
    Some(&path[open + 1..open + close])
}

fn join_base(config: &ClientConfig, path: &str) -> String {
    let mut url = config.base_url.trim_end_matches('/').to_string();
    if let Some(prefix) = &config.path_prefix {
        let prefix = prefix.trim_start_matches('/').trim_end_matches('/');
        if !prefix.is_empty() {
            url.push('/');
            url.push_str(prefix);
        }
    }
    if !path.starts_with('/') {
        url.push('/');
    }
    url.push_str(path);
    url
}
