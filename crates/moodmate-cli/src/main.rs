use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use moodmate_channels::terminal::TerminalSurface;
use moodmate_channels::web::WebChannel;
use moodmate_channels::Presenter;
use moodmate_config::{find_config_path, load_config, resolve_path, save_config, Config};
use moodmate_core::{
    Conversation, ConversationHandle, FileStore, HistoryStore, RandomJokes, Reply, SpeechInput,
    SpeechOutput,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc::UnboundedReceiver;

const STORAGE_FILE: &str = "storage.json";

/// Save terminal attributes for later restoration.
#[cfg(unix)]
fn save_terminal_state() -> Option<nix::sys::termios::Termios> {
    nix::sys::termios::tcgetattr(std::io::stdin()).ok()
}

/// Restore previously saved terminal attributes.
#[cfg(unix)]
fn restore_terminal_state(saved: &nix::sys::termios::Termios) {
    let _ = nix::sys::termios::tcsetattr(
        std::io::stdin(),
        nix::sys::termios::SetArg::TCSADRAIN,
        saved,
    );
}

/// Flush any pending input from the terminal.
#[cfg(unix)]
fn flush_pending_input() {
    let _ = nix::sys::termios::tcflush(std::io::stdin(), nix::sys::termios::FlushArg::TCIFLUSH);
}

#[derive(Parser)]
#[command(name = "moodmate", about = "Mood check-in chat bot", version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat in the terminal
    Chat {
        /// Don't speak bot replies
        #[arg(long)]
        no_speech: bool,

        /// Disable the /mic command
        #[arg(long)]
        no_voice: bool,

        /// Override the reply delay in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Serve the chat page over HTTP
    Serve,
    /// Write a default configuration
    Onboard {
        /// Skip interactive prompts and write defaults
        #[arg(long)]
        non_interactive: bool,
    },
    /// Show configuration and device capabilities
    Status,
}

#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Help,
    Mic,
    New,
    Quit,
    Say(&'a str),
}

fn parse_chat_command(input: &str) -> ChatCommand<'_> {
    match input {
        "/help" => ChatCommand::Help,
        "/mic" => ChatCommand::Mic,
        "/new" => ChatCommand::New,
        "/quit" | "/exit" | ":q" => ChatCommand::Quit,
        other => ChatCommand::Say(other),
    }
}

fn storage_path(config: &Config) -> PathBuf {
    resolve_path(&config.storage.data_dir).join(STORAGE_FILE)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Chat output shares the terminal with stderr, keep it quiet by default
    let default_level = match cli.command {
        Commands::Chat { .. } => "warn",
        _ => "info",
    };
    let base_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
    let filter = format!("{base_filter},rustyline=warn");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Onboard { non_interactive } = cli.command {
        return run_onboard(cli.config, non_interactive);
    }

    let config_path = cli.config.unwrap_or_else(find_config_path);
    if let Commands::Status = cli.command {
        return run_status(&config_path);
    }

    let config = load_config(&config_path)?;

    match cli.command {
        Commands::Chat {
            no_speech,
            no_voice,
            delay_ms,
        } => run_chat(&config, no_speech, no_voice, delay_ms).await,
        Commands::Serve => run_serve(&config).await,
        _ => unreachable!(),
    }
}

/// Wait for the worker's next reply and show it.
async fn present_next(
    replies: &mut UnboundedReceiver<Reply>,
    presenter: &mut Presenter<TerminalSurface>,
) -> Result<()> {
    let reply = replies
        .recv()
        .await
        .ok_or_else(|| anyhow::anyhow!("conversation worker has stopped"))?;
    presenter.present(&reply.outputs)
}

async fn run_chat(
    config: &Config,
    no_speech: bool,
    no_voice: bool,
    delay_ms: Option<u64>,
) -> Result<()> {
    // Save terminal state for restoration on exit
    #[cfg(unix)]
    let saved_term = save_terminal_state();

    let data_dir = resolve_path(&config.storage.data_dir);
    let history_dir = data_dir.join("history");
    std::fs::create_dir_all(&history_dir)?;
    let history_path = history_dir.join("cli_history");

    let store = FileStore::open(&storage_path(config));
    let conversation = Conversation::new(HistoryStore::new(store), Box::new(RandomJokes::new()));
    let delay = Duration::from_millis(delay_ms.unwrap_or(config.dialogue.reply_delay_ms));
    let (handle, mut replies) = ConversationHandle::spawn(conversation, delay);

    let speech: Option<Arc<dyn SpeechOutput>> = if no_speech {
        None
    } else {
        moodmate_voice::create_speech_output(&config.speech)
            .map(|s| Arc::new(s) as Arc<dyn SpeechOutput>)
    };
    let mic = if no_voice {
        None
    } else {
        moodmate_voice::create_speech_input(&config.voice_input)
    };

    let mut presenter = Presenter::new(TerminalSurface::new(), speech);

    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    println!("moodmate (type /help for commands, Ctrl-D to quit)");
    println!();
    present_next(&mut replies, &mut presenter).await?;

    let result = loop {
        // Flush any pending input before reading
        #[cfg(unix)]
        flush_pending_input();

        let readline = rl.readline("you> ");
        match readline {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(input);

                let sent = match parse_chat_command(input) {
                    ChatCommand::Quit => break Ok(()),
                    ChatCommand::Help => {
                        println!("Commands:");
                        println!("  /new   - Start over (clears saved mood history)");
                        println!("  /mic   - Answer by voice");
                        println!("  /help  - Show this help");
                        println!("  /quit  - Exit");
                        println!();
                        continue;
                    }
                    ChatCommand::New => handle.restart(),
                    ChatCommand::Mic => {
                        let Some(ref mic) = mic else {
                            println!("Voice not supported");
                            continue;
                        };
                        println!("Listening for {}s...", mic.record_secs());
                        match mic.listen().await {
                            Ok(Some(text)) => {
                                if let Err(e) = presenter.user(&text) {
                                    break Err(e);
                                }
                                handle.submit(text)
                            }
                            Ok(None) => {
                                tracing::debug!("Nothing heard");
                                continue;
                            }
                            Err(e) => {
                                tracing::debug!("Voice input failed: {e}");
                                continue;
                            }
                        }
                    }
                    ChatCommand::Say(text) => handle.submit(text),
                };

                if let Err(e) = sent {
                    break Err(e);
                }
                if let Err(e) = present_next(&mut replies, &mut presenter).await {
                    break Err(e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break Ok(());
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break Ok(());
            }
        }
    };

    let _ = rl.save_history(&history_path);

    // Restore terminal state on exit
    #[cfg(unix)]
    if let Some(ref saved) = saved_term {
        restore_terminal_state(saved);
    }

    result
}

async fn run_serve(config: &Config) -> Result<()> {
    let channel = WebChannel::new(config.gateway.clone(), &config.dialogue);
    let addr = channel.start().await?;
    println!("Serving the chat page on http://{addr} (Ctrl-C to stop)");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down {} channel", channel.name());
    channel.stop().await
}

fn prompt_with_default(prompt: &str, default: &str) -> Result<String> {
    use std::io::{self, Write};
    print!("{prompt} [{default}]: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn prompt_yes_no(prompt: &str, default_yes: bool) -> Result<bool> {
    use std::io::{self, Write};
    let default = if default_yes { "Y/n" } else { "y/N" };
    print!("{prompt} ({default}): ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim();
    if answer.is_empty() {
        return Ok(default_yes);
    }
    let lower = answer.to_lowercase();
    Ok(matches!(lower.as_str(), "y" | "yes"))
}

/// Write a config file and create the data directory.
fn run_onboard(config_arg: Option<PathBuf>, non_interactive: bool) -> Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_path = config_arg.unwrap_or_else(|| home.join(".moodmate").join("config.json"));

    if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
        println!("To reset, delete it and run `moodmate onboard` again.");
    } else {
        let mut cfg = Config::default();
        if !non_interactive {
            println!("Interactive setup");
            cfg.storage.data_dir = prompt_with_default("Data directory", &cfg.storage.data_dir)?;

            let delay = prompt_with_default(
                "Reply delay in milliseconds",
                &cfg.dialogue.reply_delay_ms.to_string(),
            )?;
            cfg.dialogue.reply_delay_ms = delay.parse().unwrap_or(cfg.dialogue.reply_delay_ms);

            cfg.speech.enabled = prompt_yes_no("Speak bot replies?", cfg.speech.enabled)?;

            cfg.voice_input.enabled =
                prompt_yes_no("Enable voice input (/mic)?", cfg.voice_input.enabled)?;
            if cfg.voice_input.enabled {
                let key = prompt_with_default("Groq API key (empty to use GROQ_API_KEY)", "")?;
                cfg.voice_input.api_key = Some(key).filter(|k| !k.is_empty());
            }

            let port = prompt_with_default("Web chat port", &cfg.gateway.port.to_string())?;
            cfg.gateway.port = port.parse().unwrap_or(cfg.gateway.port);
        }

        save_config(&config_path, &cfg)?;
        println!("Created config: {}", config_path.display());
    }

    let config = load_config(&config_path)?;
    let data_dir = resolve_path(&config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    println!("Data directory: {}", data_dir.display());

    println!();
    println!("Setup complete! Next steps:");
    println!("  1. Run `moodmate chat` to check in from the terminal");
    println!("  2. Or run `moodmate serve` and open the chat page in a browser");
    println!();
    println!("Voice notes:");
    println!("  - Speech output uses `say` on macOS, `espeak-ng` or `espeak` elsewhere.");
    println!("  - Voice input needs ffmpeg and a Groq API key.");
    println!();

    Ok(())
}

/// Show configuration and what this machine can do.
fn run_status(config_path: &Path) -> Result<()> {
    println!("moodmate status");
    println!();

    if config_path.exists() {
        println!("  Config:    {} (found)", config_path.display());
    } else {
        println!(
            "  Config:    {} (not found, using defaults)",
            config_path.display()
        );
    }

    let config = load_config(config_path)?;
    let storage = storage_path(&config);
    println!(
        "  Storage:   {} ({})",
        storage.display(),
        if storage.exists() { "found" } else { "not created yet" }
    );
    println!("  Reply delay: {}ms", config.dialogue.reply_delay_ms);
    println!(
        "  Web chat:  http://{}:{}",
        config.gateway.host, config.gateway.port
    );
    println!();

    println!("  Speech output:");
    match moodmate_voice::create_speech_output(&config.speech) {
        Some(speaker) => {
            println!("    Engine: {}", speaker.engine_name());
            println!(
                "    Voice: {}",
                speaker.voice().map(|v| v.name.as_str()).unwrap_or("default")
            );
        }
        None => println!("    unavailable"),
    }
    println!();

    println!("  Voice input:");
    println!(
        "    Enabled: {}",
        if config.voice_input.enabled { "yes" } else { "no" }
    );
    println!(
        "    ffmpeg: {}",
        if moodmate_voice::audio::ffmpeg_available() {
            "available"
        } else {
            "not found"
        }
    );
    println!(
        "    Groq API key: {}",
        if moodmate_voice::resolve_api_key(&config.voice_input).is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!("    Clip length: {}s", config.voice_input.record_secs);

    Ok(())
}
