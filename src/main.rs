use clap::Parser;
use color_eyre::Result;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ragchat::adapters::FileCredentialsProvider;
use ragchat::config::ClientConfig;
use ragchat::error::{RagError, RagResult};
use ragchat::health::probe_connection;
use ragchat::session::{
    ChatSession, ExchangeOutcome, HistoryEntry, RenderUpdate, Sender,
    SessionContext, SessionObserver,
};
use ragchat::traits::{Credentials, CredentialsProvider};
use ragchat::transport::AssistantClient;

/// ragchat - ask questions of a RAG assistant from the terminal
#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to ~/.ragchat/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Assistant service base URL
    #[arg(short, long)]
    url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "RAGCHAT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Store the key given with --api-key for later sessions
    #[arg(long, requires = "api_key")]
    save_key: bool,

    /// Ask a single question and exit
    #[arg(short, long)]
    ask: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Commands understood by the interactive prompt.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Ask(&'a str),
    SetKey(&'a str),
    ForgetKey,
    NewConversation,
    History,
    Status,
    Help,
    Quit,
    Unknown(&'a str),
    Blank,
}

fn parse_command(line: &str) -> ReplCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Blank;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplCommand::Ask(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "key" if !arg.is_empty() => ReplCommand::SetKey(arg),
        "forget-key" => ReplCommand::ForgetKey,
        "new" => ReplCommand::NewConversation,
        "history" => ReplCommand::History,
        "status" => ReplCommand::Status,
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        _ => ReplCommand::Unknown(line),
    }
}

/// Writes streamed answers to stdout as they grow.
#[derive(Default)]
struct TerminalObserver {
    printed: usize,
}

impl SessionObserver for TerminalObserver {
    fn render(&mut self, update: RenderUpdate<'_>) {
        let mut stdout = std::io::stdout().lock();
        match update {
            RenderUpdate::Partial { text } => {
                let _ = write!(stdout, "{}", &text[self.printed.min(text.len())..]);
                self.printed = text.len();
            }
            RenderUpdate::Final { text, is_error } => {
                if self.printed > 0 && is_error {
                    let _ = writeln!(stdout);
                }
                if is_error {
                    eprintln!("Error: {}", text);
                } else {
                    if self.printed == 0 {
                        let _ = write!(stdout, "{}", text);
                    }
                    let _ = writeln!(stdout);
                }
                self.printed = 0;
            }
        }
        let _ = stdout.flush();
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ragchat=debug" } else { "ragchat=warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for entry in entries {
        let time = chrono::DateTime::from_timestamp_millis(entry.timestamp())
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
            .unwrap_or_default();
        let who = match (entry.sender(), entry.is_error()) {
            (Sender::User, _) => "you",
            (Sender::Assistant, false) => "assistant",
            (Sender::Assistant, true) => "error",
        };
        println!("[{}] {}: {}", time, who, entry.content());
    }
}

fn print_help() {
    println!("Type a question and press Enter. Commands:");
    println!("  /key <token>   set (and store) the API key");
    println!("  /forget-key    remove the API key");
    println!("  /new           start a new conversation");
    println!("  /history       show this session's messages");
    println!("  /status        check the server");
    println!("  /quit          exit");
}

/// Run one exchange, cancelling it on Ctrl-C.
async fn ask(
    session: &mut ChatSession<TerminalObserver>,
    client: &AssistantClient,
    prompt: &str,
) -> Option<ExchangeOutcome> {
    let token = CancellationToken::new();
    let handle = token.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let result = session.send(client, prompt, token).await;
    watcher.abort();

    match result {
        Ok(ExchangeOutcome::Cancelled) => {
            session.observer_mut().printed = 0;
            println!();
            eprintln!("(cancelled)");
            Some(ExchangeOutcome::Cancelled)
        }
        Ok(outcome) => Some(outcome),
        Err(e) => {
            let err = RagError::from(e);
            eprintln!("{}", err.report());
            if err.requires_reauth() {
                eprintln!("  Use /key <token> to set one.");
            }
            None
        }
    }
}

async fn show_status(session: &mut ChatSession<TerminalObserver>, client: &AssistantClient) {
    let report = probe_connection(client, session.context_mut()).await;
    println!("{}", report);
    println!("Server: {}", client.base_url());
    println!(
        "Conversation: {}",
        session.context().conversation_id().unwrap_or("(new)")
    );

    let Some(credential) = session.context().credential().map(str::to_string) else {
        println!("API key: not set");
        return;
    };
    match client.fetch_config(&credential).await {
        Ok(config) => {
            println!("Model: {}", config.ollama_model.as_deref().unwrap_or("unknown"));
            if let Some(url) = config.ollama_base_url {
                println!("Model server: {}", url);
            }
        }
        Err(e) => println!("Config unavailable: {}", e.user_message()),
    }
}

/// Resolve configuration and build the client and credential store.
fn setup(cli: &Cli) -> RagResult<(AssistantClient, FileCredentialsProvider)> {
    let config = ClientConfig::load(cli.config.as_deref())?.with_overrides(cli.url.clone())?;
    let client = AssistantClient::from_config(&config)?;
    let credentials = match config.credentials_path() {
        Some(path) => FileCredentialsProvider::at_path(path),
        None => FileCredentialsProvider::new()?,
    };
    Ok((client, credentials))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (client, credentials) = match setup(&cli) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::debug!(category = %e.category(), "Startup failed");
            eprintln!("{}", e.report());
            std::process::exit(2);
        }
    };

    let mut context = SessionContext::new();
    match cli.api_key.as_deref() {
        Some(key) => {
            context.set_credential(key);
            if cli.save_key {
                credentials.save(&Credentials::with_api_key(key.trim())).await?;
                eprintln!("API key saved to {}", credentials.credentials_path().display());
            }
        }
        None => match credentials.load().await {
            Ok(Some(stored)) => {
                if let Some(key) = stored.api_key() {
                    context.set_credential(key);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring stored credentials: {}", e),
        },
    }

    let report = probe_connection(&client, &mut context).await;
    eprintln!("{}", report);

    let mut session = ChatSession::new(context, TerminalObserver::default());

    if let Some(question) = cli.ask.as_deref() {
        let outcome = ask(&mut session, &client, question).await;
        let failed = !matches!(outcome, Some(ExchangeOutcome::Answered { .. }));
        std::process::exit(if failed { 1 } else { 0 });
    }

    if !session.context().has_credential() {
        eprintln!("No API key set. Use /key <token> before asking.");
    }
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match parse_command(&line) {
            ReplCommand::Blank => {}
            ReplCommand::Ask(prompt) => {
                ask(&mut session, &client, prompt).await;
            }
            ReplCommand::SetKey(key) => {
                session.context_mut().set_credential(key);
                match credentials.save(&Credentials::with_api_key(key)).await {
                    Ok(()) => println!("API key set. Starting a new conversation."),
                    Err(e) => {
                        tracing::warn!("Failed to store API key: {}", e);
                        println!("API key set for this session only.");
                    }
                }
            }
            ReplCommand::ForgetKey => {
                session.context_mut().clear_credential();
                if let Err(e) = credentials.clear().await {
                    tracing::warn!("Failed to remove stored API key: {}", e);
                }
                println!("API key removed.");
            }
            ReplCommand::NewConversation => {
                session.context_mut().clear_conversation();
                println!("Started a new conversation.");
            }
            ReplCommand::History => print_history(session.history().entries()),
            ReplCommand::Status => show_status(&mut session, &client).await,
            ReplCommand::Help => print_help(),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(text) => {
                println!("Unknown command: {} (try /help)", text);
            }
        }
    }

    tracing::debug!(messages = session.history().len(), "Session closed");
    Ok(())
}
