//! `modelgate doctor`: config validation and credential audit.
//!
//! Prints a sectioned report with `[ok]`, `[warn]`, `[fail]` or `[info]`
//! per item and exits non-zero when anything failed.

use {
    anyhow::Result,
    modelgate_config::{
        ModelgateConfig, Severity,
        validate::{self, ValidationResult},
    },
    modelgate_providers::{Credentials, ProviderId, ProviderRegistry},
    modelgate_routing::RouterOptions,
};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Info => CYAN,
        }
    }
}

struct Section {
    title: String,
    items: Vec<(Status, String)>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push((status, message.into()));
    }
}

fn print_report(sections: &[Section]) -> (usize, usize) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for (status, message) in &section.items {
            eprintln!("  [{}{}{RESET}]  {message}", status.color(), status.label());
            match status {
                Status::Fail => errors += 1,
                Status::Warn => warnings += 1,
                _ => {},
            }
        }
        eprintln!();
    }

    (errors, warnings)
}

// ── Checks ──────────────────────────────────────────────────────────────────

fn config_section(result: &ValidationResult, verbose: bool) -> Section {
    let mut section = Section::new("Config");
    match result.config_path {
        Some(ref path) => section.push(Status::Info, format!("file: {}", path.display())),
        None => section.push(Status::Info, "no config file found, using defaults"),
    }
    for d in &result.diagnostics {
        let status = match d.severity {
            Severity::Error => Status::Fail,
            Severity::Warning => Status::Warn,
            Severity::Info if verbose => Status::Info,
            Severity::Info => continue,
        };
        if d.path.is_empty() {
            section.push(status, d.message.clone());
        } else {
            section.push(status, format!("{}: {}", d.path, d.message));
        }
    }
    if !result.has_errors() && result.count(Severity::Warning) == 0 {
        section.push(Status::Ok, "no issues found");
    }
    section
}

fn providers_section(config: &ModelgateConfig, credentials: &Credentials) -> Section {
    let mut section = Section::new("Providers");
    let registry = ProviderRegistry::from_config(&config.providers);
    for provider in ProviderId::ALL {
        let name = provider.display_name();
        if !config.providers.is_enabled(provider.as_str()) {
            section.push(Status::Info, format!("{name}: disabled in config"));
        } else if credentials.has(provider) {
            let model = registry.default_model(provider, modelgate_providers::Capability::Chat);
            section.push(Status::Ok, format!("{name}: credential found (default model {model})"));
        } else {
            section.push(
                Status::Info,
                format!("{name}: no credential, set {}", provider.env_key()),
            );
        }
    }
    if credentials.is_empty() {
        section.push(
            Status::Warn,
            "no provider has a credential; every request will get a mock response",
        );
    }
    section
}

fn routing_section(config: &ModelgateConfig, credentials: &Credentials) -> Section {
    let mut section = Section::new("Routing");
    let options = RouterOptions::from_config(&config.routing);
    for (label, order) in [("chat", &options.chat_order), ("code", &options.code_order)] {
        let names: Vec<&str> = order.iter().map(|p| p.as_str()).collect();
        let reachable = order.iter().filter(|p| credentials.has(**p)).count();
        let status = if reachable == 0 {
            Status::Warn
        } else {
            Status::Ok
        };
        section.push(
            status,
            format!(
                "{label} order: {} ({reachable} credentialed)",
                names.join(" -> ")
            ),
        );
    }
    section.push(
        Status::Info,
        format!("attempt timeout: {}s", options.attempt_timeout.as_secs()),
    );
    section
}

pub fn handle_doctor(verbose: bool) -> Result<()> {
    let result = validate::validate(None);
    let config = modelgate_config::discover_and_load();
    let credentials = Credentials::from_env_with_config(&config.providers);

    let sections = [
        config_section(&result, verbose),
        providers_section(&config, &credentials),
        routing_section(&config, &credentials),
    ];
    let (errors, warnings) = print_report(&sections);
    eprintln!("{errors} error(s), {warnings} warning(s)");

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, modelgate_config::ProviderEntry};

    #[test]
    fn empty_credentials_warn() {
        let config = ModelgateConfig::default();
        let section = providers_section(&config, &Credentials::default());
        assert!(section.items.iter().any(|(s, _)| *s == Status::Warn));
    }

    #[test]
    fn disabled_provider_is_reported() {
        let mut config = ModelgateConfig::default();
        config.providers.providers.insert("openai".into(), ProviderEntry {
            enabled: false,
            ..Default::default()
        });
        let credentials = Credentials::with_keys([(ProviderId::DeepSeek, "k".to_string())]);
        let section = providers_section(&config, &credentials);
        assert!(
            section
                .items
                .iter()
                .any(|(_, m)| m == "OpenAI: disabled in config")
        );
        assert!(section.items.iter().all(|(s, _)| *s != Status::Warn));
    }

    #[test]
    fn routing_counts_credentialed_providers() {
        let config = ModelgateConfig::default();
        let credentials = Credentials::with_keys([(ProviderId::Anthropic, "k".to_string())]);
        let section = routing_section(&config, &credentials);
        assert_eq!(section.items[0].0, Status::Ok);
        assert!(section.items[0].1.contains("openai -> anthropic -> deepseek"));
        assert!(section.items[0].1.contains("(1 credentialed)"));
    }
}
