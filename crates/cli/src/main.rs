mod doctor_commands;
mod route_commands;

use {
    clap::{Parser, Subcommand},
    modelgate_providers::Capability,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "modelgate", about = "modelgate: multi-provider AI request router", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Custom config directory (overrides default ~/.config/modelgate/).
    #[arg(long, global = true, env = "MODELGATE_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// List the models the router knows about.
    Models {
        /// Which request kind to list models for (chat, code).
        #[arg(long, default_value = "chat")]
        capability: Capability,
    },
    /// Send one chat message through the router.
    Chat {
        #[arg(short, long)]
        message: String,
        /// Model id to pin, or "auto".
        #[arg(long)]
        model: Option<String>,
    },
    /// Generate code through the router.
    Code {
        #[arg(short, long)]
        prompt: String,
        #[arg(short, long)]
        language: Option<String>,
        /// Model id to pin, or "auto".
        #[arg(long)]
        model: Option<String>,
    },
    /// Config validation and credential audit.
    Doctor {
        /// Show informational diagnostics too.
        #[arg(long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    // Apply the directory override before any config is read.
    if let Some(ref dir) = cli.config_dir {
        modelgate_config::set_config_dir(dir.clone());
    }

    match cli.command {
        None | Some(Commands::Gateway) => {
            info!(version = env!("CARGO_PKG_VERSION"), "modelgate starting");
            let config = modelgate_config::discover_and_load();

            // CLI args override config values
            let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());
            let port = cli.port.unwrap_or(config.server.port);

            modelgate_gateway::server::start_gateway(&config, &bind, port).await
        },
        Some(Commands::Models { capability }) => route_commands::list_models(capability),
        Some(Commands::Chat { message, model }) => route_commands::chat(message, model).await,
        Some(Commands::Code {
            prompt,
            language,
            model,
        }) => route_commands::code(prompt, language, model).await,
        Some(Commands::Doctor { verbose }) => doctor_commands::handle_doctor(verbose),
    }
}
