//! Configuration validation engine.
//!
//! Validates TOML configuration files against the known schema, detects
//! unknown/misspelled fields and flags routing orders that cannot work.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use crate::schema::{KNOWN_PROVIDER_NAMES, ModelgateConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "unknown-provider", "type-error",
    /// "routing", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "routing.chat_order[1]"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

/// Expected shape of the configuration schema.
enum KnownKeys {
    /// A struct with fixed field names.
    Struct(HashMap<&'static str, KnownKeys>),
    /// A map with dynamic keys (providers) whose values have a known shape.
    Map(Box<KnownKeys>),
    /// A scalar or array of scalars; not inspected further.
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Map, Struct};

    let server = Struct(HashMap::from([("bind", Leaf), ("port", Leaf)]));
    let routing = Struct(HashMap::from([
        ("chat_order", Leaf),
        ("code_order", Leaf),
        ("attempt_timeout_secs", Leaf),
    ]));
    let provider_entry = Struct(HashMap::from([
        ("enabled", Leaf),
        ("api_key", Leaf),
        ("base_url", Leaf),
        ("model", Leaf),
    ]));
    let metrics = Struct(HashMap::from([("enabled", Leaf)]));

    Struct(HashMap::from([
        ("server", server),
        ("routing", routing),
        ("providers", Map(Box::new(provider_entry))),
        ("metrics", metrics),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Find the closest candidate within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => crate::loader::find_config_file(),
    };

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Info,
                category: "file-ref",
                path: String::new(),
                message: "no config file found; using defaults".into(),
            }],
            config_path: None,
        };
    };

    match std::fs::read_to_string(actual_path) {
        Ok(content) => {
            let content = crate::env_subst::substitute_env(&content);
            let mut result = match as_toml(&content, actual_path) {
                Ok(toml_str) => validate_toml_str(&toml_str),
                Err(message) => ValidationResult {
                    diagnostics: vec![Diagnostic {
                        severity: Severity::Error,
                        category: "syntax",
                        path: String::new(),
                        message,
                    }],
                    config_path: None,
                },
            };
            result.config_path = Some(actual_path.clone());
            result
        },
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: format!("failed to read config file: {e}"),
            }],
            config_path: Some(actual_path.clone()),
        },
    }
}

/// Re-encode YAML and JSON configs as TOML so one checker covers every format.
fn as_toml(content: &str, path: &Path) -> Result<String, String> {
    let mut value: serde_json::Value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => {
            serde_yaml::from_str(content).map_err(|e| format!("YAML syntax error: {e}"))?
        },
        Some("json") => {
            serde_json::from_str(content).map_err(|e| format!("JSON syntax error: {e}"))?
        },
        _ => return Ok(content.to_string()),
    };
    drop_nulls(&mut value);
    toml::to_string(&value).map_err(|e| format!("unsupported value in config: {e}"))
}

/// TOML has no null; a null field reads the same as an absent one.
fn drop_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(drop_nulls);
        },
        serde_json::Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(drop_nulls);
        },
        _ => {},
    }
}

/// Validate a TOML string without file-system side effects.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let toml_value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: format!("TOML syntax error: {e}"),
            });
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    check_unknown_fields(&toml_value, &build_schema_map(), "", &mut diagnostics);

    if let Some(providers) = toml_value.get("providers").and_then(|v| v.as_table()) {
        check_provider_names(providers, &mut diagnostics);
    }

    match toml::from_str::<ModelgateConfig>(toml_str) {
        Ok(config) => check_routing(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: String::new(),
            message: format!("type error: {e}"),
        }),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Walk the TOML value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &toml::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(table) = value.as_table() else {
        return;
    };
    match schema {
        KnownKeys::Struct(fields) => {
            let known_keys: Vec<&str> = fields.keys().copied().collect();
            for (key, child_value) in table {
                let path = join_path(prefix, key);
                if let Some(child_schema) = fields.get(key.as_str()) {
                    check_unknown_fields(child_value, child_schema, &path, diagnostics);
                    continue;
                }
                let message = match suggest(key, &known_keys, 3) {
                    Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
                    None => "unknown field".to_string(),
                };
                diagnostics.push(Diagnostic {
                    severity: Severity::Error,
                    category: "unknown-field",
                    path,
                    message,
                });
            }
        },
        KnownKeys::Map(value_schema) => {
            for (key, child_value) in table {
                check_unknown_fields(child_value, value_schema, &join_path(prefix, key), diagnostics);
            }
        },
        KnownKeys::Leaf => {},
    }
}

/// Warn about provider sections the gateway has no client for.
fn check_provider_names(
    providers: &toml::map::Map<String, toml::Value>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for name in providers.keys() {
        if KNOWN_PROVIDER_NAMES.contains(&name.as_str()) {
            continue;
        }
        let message = match suggest(name, KNOWN_PROVIDER_NAMES, 3) {
            Some(s) => format!("unknown provider name (did you mean \"{s}\"?)"),
            None => format!(
                "unknown provider name; supported: {}",
                KNOWN_PROVIDER_NAMES.join(", ")
            ),
        };
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "unknown-provider",
            path: format!("providers.{name}"),
            message,
        });
    }
}

/// Semantic checks on the routing section of a parsed config.
fn check_routing(config: &ModelgateConfig, diagnostics: &mut Vec<Diagnostic>) {
    for (field, order) in [
        ("chat_order", &config.routing.chat_order),
        ("code_order", &config.routing.code_order),
    ] {
        if order.is_empty() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                category: "routing",
                path: format!("routing.{field}"),
                message: "empty provider order; the built-in order will be used".into(),
            });
        }

        let mut seen = HashSet::new();
        for (i, name) in order.iter().enumerate() {
            let path = format!("routing.{field}[{i}]");
            if !KNOWN_PROVIDER_NAMES.contains(&name.as_str()) {
                diagnostics.push(Diagnostic {
                    severity: Severity::Error,
                    category: "unknown-provider",
                    path,
                    message: format!("unknown provider \"{name}\""),
                });
            } else if !seen.insert(name.as_str()) {
                diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    category: "routing",
                    path,
                    message: format!("provider \"{name}\" listed more than once"),
                });
            } else if !config.providers.is_enabled(name) {
                diagnostics.push(Diagnostic {
                    severity: Severity::Info,
                    category: "routing",
                    path,
                    message: format!("provider \"{name}\" is disabled and will be skipped"),
                });
            }
        }
    }

    if config.routing.attempt_timeout_secs == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "routing",
            path: "routing.attempt_timeout_secs".into(),
            message: "timeout must be greater than zero".into(),
        });
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
