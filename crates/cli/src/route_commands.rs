//! One-shot commands that run the router in-process, without the HTTP server.

use {
    anyhow::Result,
    modelgate_gateway::state::GatewayState,
    modelgate_providers::{Capability, Credentials, ProviderRegistry},
    modelgate_routing::{ChatTask, CodeTask, FallbackRouter},
};

fn load_router() -> Result<FallbackRouter> {
    GatewayState::build_router(&modelgate_config::discover_and_load())
}

pub fn list_models(capability: Capability) -> Result<()> {
    let config = modelgate_config::discover_and_load();
    let registry = ProviderRegistry::from_config(&config.providers);
    let credentials = Credentials::from_env_with_config(&config.providers);

    println!("{:<28} {:<20} {:<10} STATUS", "ID", "NAME", "PROVIDER");
    println!("{:<28} {:<20} {:<10} ready", "auto", "Auto (best available)", "-");
    for model in registry.list_models(capability) {
        let status = if credentials.has(model.provider) {
            "ready".to_string()
        } else {
            format!("set {}", model.provider.env_key())
        };
        println!(
            "{:<28} {:<20} {:<10} {status}",
            model.id,
            model.display_name,
            model.provider.as_str()
        );
    }
    Ok(())
}

pub async fn chat(message: String, model: Option<String>) -> Result<()> {
    let router = load_router()?;
    let done = router.route(&ChatTask::new(message, model)).await?;
    eprintln!("[{}]", done.model);
    println!("{}", done.text);
    Ok(())
}

pub async fn code(prompt: String, language: Option<String>, model: Option<String>) -> Result<()> {
    let router = load_router()?;
    let done = router.route(&CodeTask::new(prompt, language, model)).await?;
    eprintln!("[{}]", done.model);
    println!("{}", done.text);
    Ok(())
}
