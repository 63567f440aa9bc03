mod config;
mod error;

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use runtime::tools::builtin;
use runtime::{
    Agent, AnthropicBackend, CompletionEngine, OpenAiBackend, ToolRegistry, Turn,
    build_system_instruction, final_answer,
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use config::{Config, Provider};
use error::Result;

const CONFIG_FILE: &str = "reagent.toml";

#[derive(Parser)]
#[command(name = "reagent")]
#[command(about = "A ReAct tool-calling agent", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ./reagent.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured model
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive question/answer session
    Chat,
    /// List the available tools
    Tools,
    /// Print the system instruction sent to the model
    Prompt,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(model) = cli.model {
        config.backend.model = Some(model);
    }

    init_tracing(&config.log.filter);

    let tools = builtin::registry(&config.builtin_config())?;

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(&config, tools).await,
        Some(Commands::Tools) => {
            cmd_tools(&tools);
            Ok(())
        }
        Some(Commands::Prompt) => {
            print!("{}", build_system_instruction(tools.specs()));
            Ok(())
        }
    }
}

/// An explicit path must exist; the default file is optional.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_tools(tools: &ToolRegistry) {
    if tools.is_empty() {
        println!("No tools registered.");
        return;
    }

    println!("{:<16}  {:<16}  PARAMETERS", "NAME", "DISPLAY NAME");
    println!("{}", "-".repeat(60));
    for spec in tools.specs() {
        let params = spec
            .parameters
            .iter()
            .map(|p| {
                let marker = if p.required { "" } else { "?" };
                format!("{}{marker}: {}", p.name, p.type_tag)
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:<16}  {:<16}  {params}", spec.internal_name, spec.display_name);
    }
}

async fn cmd_chat(config: &Config, tools: ToolRegistry) -> Result<()> {
    let model = config.model();
    let timeout = config.backend_timeout();

    match config.backend.provider {
        Provider::Anthropic => {
            let backend = AnthropicBackend::builder(config.anthropic_key()?, &model)
                .max_tokens(config.backend.max_tokens)
                .timeout(timeout)
                .build()?;
            chat_loop(Agent::new(backend, tools)).await
        }
        Provider::OpenAi => {
            let mut builder = OpenAiBackend::builder(&config.backend.base_url, &model)
                .max_tokens(config.backend.max_tokens)
                .timeout(timeout);
            if let Some(key) = &config.backend.api_key {
                builder = builder.api_key(key);
            }
            if let Some(enable) = config.backend.enable_thinking {
                builder = builder.enable_thinking(enable);
            }
            chat_loop(Agent::new(builder.build()?, tools)).await
        }
    }
}

async fn chat_loop<E: CompletionEngine + Display>(agent: Agent<E>) -> Result<()> {
    println!("reagent v{}", env!("CARGO_PKG_VERSION"));
    println!("Backend: {}", agent.engine());
    let names = agent
        .tools()
        .specs()
        .iter()
        .map(|s| s.internal_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Tools: {names}");
    println!("Agent initialized. Type 'exit' or 'quit' to leave.\n");

    repl(&agent, io::stdin().lock(), io::stdout()).await?;
    Ok(())
}

/// Answer questions read from `input` until EOF or an exit word.
///
/// A failed turn is reported and leaves the history untouched. Returns the
/// history built by the successful turns.
async fn repl<E: CompletionEngine>(
    agent: &Agent<E>,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<Vec<Turn>> {
    let mut history: Vec<Turn> = Vec::new();

    loop {
        write!(output, "input: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit(question) {
            break;
        }

        match agent.run_turn(question, &history).await {
            Ok(result) => {
                debug!(
                    tool = result.tool_call.as_ref().map(|c| c.tool_name.as_str()),
                    input_tokens = result.usage.input_tokens,
                    output_tokens = result.usage.output_tokens,
                    "turn complete"
                );
                writeln!(output, "\nAgent: {}\n", final_answer(&result.final_text))?;
                history = result.history;
            }
            Err(e) => {
                error!(error = %e, "turn failed");
                writeln!(output, "Error: {e}\n")?;
            }
        }
    }

    writeln!(output, "Exiting...")?;
    Ok(history)
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
