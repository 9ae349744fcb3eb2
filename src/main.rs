//! Hedera Agent CLI Chatbot
//!
//! Entry point: parse CLI args, run the bootstrap sequence, then hand
//! the assembled executor to the REPL. Any bootstrap failure is fatal
//! and reported before the first prompt.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hedera_chat::agent::{AgentExecutor, BufferMemory, StructuredChatAgent};
use hedera_chat::config::Settings;
use hedera_chat::hedera::{HederaClient, Operator};
use hedera_chat::hub::HubClient;
use hedera_chat::llm::OpenAiChatClient;
use hedera_chat::repl;
use hedera_chat::toolkit::{AgentMode, HederaToolkit, ToolkitConfiguration, ToolkitContext};
use hedera_chat::types::Network;

/// Hedera Agent CLI Chatbot
#[derive(Parser, Debug)]
#[command(
    name = "hedera-chat",
    version,
    about = "Chat with a tool-calling agent bound to the Hedera network"
)]
struct Cli {
    /// Hedera network the operator account lives on
    #[arg(long, value_enum, default_value_t = Network::Testnet)]
    network: Network,

    /// Model identifier for the chat completions endpoint
    #[arg(long)]
    model: Option<String>,

    /// Prompt registry entry to pull (owner/name)
    #[arg(long)]
    prompt_repo: Option<String>,
}

/// Assemble the executor. Each stage consumes the previous stage's
/// output, so the order here is a correctness requirement.
async fn bootstrap(cli: Cli) -> Result<AgentExecutor> {
    // Environment and credential validation
    let settings = Settings::from_env(cli.network, cli.model, cli.prompt_repo)
        .context("Failed to load configuration from environment")?;
    info!(network = %settings.network, model = %settings.model, "configuration loaded");

    // Language-model client
    let llm = Arc::new(OpenAiChatClient::new(
        settings.openai_base_url.clone(),
        settings.openai_api_key.clone(),
        settings.model.clone(),
    ));

    // Network client from the operator credentials
    let operator =
        Operator::from_settings(&settings).context("Failed to construct operator identity")?;
    info!(account = %operator.account_id, evm_address = %operator.evm_address, "operator ready");
    let client = HederaClient::for_network(settings.network, operator);

    // Toolkit: autonomous execution, empty allow-list loads every tool
    let toolkit = HederaToolkit::new(
        client,
        ToolkitConfiguration {
            tools: Vec::new(),
            context: ToolkitContext {
                mode: AgentMode::Autonomous,
            },
        },
    )
    .context("Failed to construct Hedera toolkit")?;

    // Structured chat prompt from the registry
    let template = HubClient::default()
        .pull(&settings.prompt_repo)
        .await
        .context("Failed to fetch prompt template")?;

    // Tools from the toolkit, then the agent over (model, tools, prompt)
    let tools = toolkit.get_tools();
    info!(tool_count = tools.len(), "toolkit ready");
    let agent = StructuredChatAgent::new(llm, &tools, &template)
        .context("Failed to construct agent")?;

    // Conversation memory, then the executor binding it all together
    let memory = BufferMemory::new();
    Ok(AgentExecutor::new(agent, toolkit, memory))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hedera_chat=warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut executor = match bootstrap(cli).await {
        Ok(executor) => executor,
        Err(err) => {
            eprintln!("Fatal error during CLI bootstrap: {:#}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = repl::run(&mut executor).await {
        eprintln!("Fatal: {:#}", err);
        std::process::exit(1);
    }
}
