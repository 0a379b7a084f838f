//! Command-line client for asking an LLM questions from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Ask a question
//! quaero how do I list open ports on linux
//!
//! # Pipe in context
//! cat build.log | quaero why did this build fail
//!
//! # Print the whole answer at once instead of streaming
//! quaero --no-stream summarize the plot of hamlet
//! ```
//!
//! Configuration is read from `~/.config/quaero.yaml` (or `--config PATH`).

use std::io::{IsTerminal, Read, Write};
use std::path::Path;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use tokio_util::sync::CancellationToken;

use quaero::{Config, Error, LlmProvider, OpenAi, Result};

/// Command-line arguments for the quaero tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct Args {
    /// Path to the configuration file.
    #[arrrg(optional, "Path to the configuration file", "PATH")]
    config: Option<String>,

    /// Print the answer all at once instead of streaming it.
    #[arrrg(flag, "Print the answer all at once instead of streaming")]
    no_stream: bool,

    /// Print version information and exit.
    #[arrrg(flag, "Print version information and exit")]
    version: bool,
}

/// Main entry point for the quaero command-line tool.
#[tokio::main]
async fn main() {
    let (args, question_words) = Args::from_command_line_relaxed("quaero [OPTIONS] [QUESTION]...");

    if args.version {
        println!("quaero version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let stdin_content = match read_piped_stdin() {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading from stdin: {e}");
            std::process::exit(1);
        }
    };

    let Some(question) = compose_question(&question_words, &stdin_content) else {
        print_usage();
        return;
    };

    let config_path = args.config.as_deref().map(Path::new);
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) if e.is_not_found() => {
            print_config_help();
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Ctrl-C aborts the in-flight request; output already printed stays.
    let cancel = CancellationToken::new();
    let ctrlc_cancel = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || ctrlc_cancel.cancel()) {
        eprintln!("Error installing signal handler: {e}");
        std::process::exit(1);
    }

    let provider: Box<dyn LlmProvider> = match OpenAi::new(config.llm.openai.clone()) {
        Ok(client) => Box::new(client.with_cancellation(cancel)),
        Err(e) => {
            eprintln!("Error creating LLM provider: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = handle_question(provider.as_ref(), &question, args.no_stream).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Read stdin in full when input is piped in; an interactive terminal
/// contributes nothing.
fn read_piped_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut content = String::new();
    stdin
        .read_to_string(&mut content)
        .map_err(|e| Error::io("failed to read from stdin", e))?;
    Ok(content)
}

/// Combine the question words and any piped input into the final question.
///
/// Returns None when there is nothing to ask.
fn compose_question(question_words: &[String], stdin_content: &str) -> Option<String> {
    let question = question_words.join(" ");
    match (question.is_empty(), stdin_content.is_empty()) {
        (true, true) => None,
        (true, false) => Some(stdin_content.to_string()),
        (false, true) => Some(question),
        (false, false) => Some(format!("{question}\n\nContext:\n{stdin_content}")),
    }
}

/// Ask the question and print the answer, streaming unless disabled.
async fn handle_question(
    provider: &dyn LlmProvider,
    question: &str,
    no_stream: bool,
) -> Result<()> {
    if no_stream {
        let answer = provider.ask(question).await?;
        println!("{answer}");
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    provider
        .ask_stream(question, &mut |fragment: &str| {
            write!(stdout, "{fragment}")?;
            stdout.flush()?;
            Ok(())
        })
        .await?;
    println!();
    Ok(())
}

fn print_usage() {
    println!("Usage: quaero [OPTIONS] [QUESTION]...");
    println!();
    println!("Ask a question from the terminal; pipe text in to use it as context.");
    println!();
    println!("Options:");
    println!("  --config PATH   Path to the configuration file");
    println!("  --no-stream     Print the answer all at once instead of streaming");
    println!("  --version       Print version information and exit");
}

fn print_config_help() {
    println!("Configuration file not found. Please create a configuration file at ~/.config/quaero.yaml");
    println!("Example configuration:");
    println!("```yaml");
    println!("llm:");
    println!("  openai:");
    println!("    # Base URL for the OpenAI API. You can specify:");
    println!("    # - Full endpoint URL: https://api.openai.com/v1/chat/completions");
    println!("    # - Base API URL: https://api.openai.com/v1");
    println!("    # - For Azure, use your Azure OpenAI resource endpoint");
    println!("    base_url: https://api.openai.com/v1");
    println!("    # Your OpenAI API key or Azure API key");
    println!("    api_key: your-api-key");
    println!("    # Model name to use (default: gpt-4)");
    println!("    model_name: gpt-4");
    println!("    # For Azure OpenAI, specify your deployment name");
    println!("    azure_deployment_name: optional-azure-deployment-name");
    println!("```");
}
