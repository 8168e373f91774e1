mod command;
mod logging;
mod render;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use rustyline::history::DefaultHistory;
use tokio::task::JoinHandle;

use tomodachi_core::config::AppConfig;
use tomodachi_core::persona::WildcardMode;
use tomodachi_core::secret::SecretService;
use tomodachi_core::session::SessionContext;
use tomodachi_core::transcript::Turn;
use tomodachi_infrastructure::{ConfigService, SecretServiceImpl, ServiceType, TomodachiPaths};
use tomodachi_interaction::{
    ConversationService, GeminiApiAgent, ResNetModel, TtaClassifier, WebSearchAgent,
};

use crate::command::{COMMANDS, Command};
use crate::render::TurnRenderer;

/// ぼくのともだち: several characters answer every message together.
#[derive(Parser, Debug)]
#[command(name = "tomodachi", version)]
struct Args {
    /// Name the characters call you by.
    #[arg(long)]
    name: Option<String>,

    /// Age the characters act as.
    #[arg(long)]
    age: Option<u32>,

    /// Directory holding config.toml, secret.json and logs/.
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// `fixed_per_session` or `regenerated_per_turn`.
    #[arg(long)]
    wildcard_mode: Option<WildcardMode>,
}

impl Args {
    /// Command-line values win over config.toml.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(name) = self.name.as_ref().filter(|n| !n.trim().is_empty()) {
            config.chat.user_name = name.trim().to_string();
        }
        if let Some(age) = self.age {
            config.chat.ai_age = age.max(1);
        }
        if let Some(mode) = self.wildcard_mode {
            config.chat.wildcard_mode = mode;
        }
    }
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Prints a spinner on stderr until aborted.
fn start_waiting_indicator() -> JoinHandle<()> {
    tokio::spawn(async {
        const FRAMES: [&str; 4] = ["⠋", "⠙", "⠸", "⠴"];
        let mut interval = tokio::time::interval(Duration::from_millis(150));
        for frame in FRAMES.iter().cycle() {
            interval.tick().await;
            eprint!("\r{} {}", frame, "みんなが考え中...".bright_black());
            let _ = std::io::stderr().flush();
        }
    })
}

fn stop_waiting_indicator(handle: JoinHandle<()>) {
    handle.abort();
    eprint!("\r\x1b[2K");
    let _ = std::io::stderr().flush();
}

fn print_turns(renderer: &TurnRenderer, turns: &[Turn], user_name: &str) {
    for turn in turns {
        println!("{}", renderer.render(turn, user_name));
        println!();
    }
}

/// Builds the conversation service from secrets and settings.
///
/// A `[vision]` model that fails to load leaves image analysis off.
async fn build_service(
    config: &AppConfig,
    secrets: &SecretServiceImpl,
    config_dir: &Path,
) -> Result<ConversationService> {
    let agent = GeminiApiAgent::from_secrets(secrets, &config.chat.model_name).await?;
    tracing::info!(model = %agent.model(), "Completion client ready");
    let mut service = ConversationService::new(Arc::new(agent));

    if config.search.enabled {
        let search_key = secrets
            .load_secrets()
            .await
            .map_err(|e| anyhow::anyhow!(e))?
            .search
            .map(|s| s.api_key);
        let search = WebSearchAgent::new(&config.search).with_api_key(search_key);
        service = service.with_search(Arc::new(search));
        tracing::info!(endpoint = %config.search.endpoint, "Web search enabled");
    }

    if let Some(vision) = &config.vision {
        match ResNetModel::load(vision, config_dir) {
            Ok(model) => {
                let classifier = TtaClassifier::new(model).with_top_k(vision.top_k);
                service = service.with_classifier(Arc::new(classifier));
            }
            Err(e) => {
                tracing::warn!("Image model unavailable: {}", e);
                eprintln!("{}", format!("画像解析モデルを読み込めませんでした: {e}").yellow());
            }
        }
    }

    Ok(service)
}

/// Prints the setup hint and returns the error `main` exits with.
fn startup_failure(error: anyhow::Error, secret_path: &Path) -> anyhow::Error {
    tracing::warn!("Startup failed: {:#}", error);
    eprintln!("{}", startup_hint(secret_path).yellow());
    error.context("起動できませんでした")
}

fn startup_hint(secret_path: &Path) -> String {
    format!(
        "{} に Gemini の api_key を設定するか、環境変数 GEMINI_API_KEY を指定してください。",
        secret_path.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let paths = TomodachiPaths::new(args.config_dir.as_deref());
    let _log_guard = logging::init(&paths)?;

    let config_service = ConfigService::with_path(paths.get_path(ServiceType::Config)?);
    let mut config = config_service.load_or_default();
    args.apply(&mut config);

    let secrets = SecretServiceImpl::with_path(paths.get_path(ServiceType::Secret)?);
    let service = match build_service(&config, &secrets, &paths.config_dir()?).await {
        Ok(service) => service,
        Err(e) => return Err(startup_failure(e, &paths.get_path(ServiceType::Secret)?)),
    };

    let mut session = SessionContext::from_settings(&config.chat);
    let renderer = TurnRenderer::new(&config.theme);
    tracing::info!(session_id = %session.id(), "Session started");

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!(
        "{}",
        "=== ぼくのともだち ===".color(renderer.header_color()).bold()
    );
    println!(
        "{}",
        "メッセージを入力するとみんなが答えます。/quiz /image <path> /summary /reset /age <n> /name <名前> /history, 'quit' で終了。"
            .bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let prompt = format!("{}> ", session.user_name());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        let turns = match Command::parse(trimmed) {
            Command::Quit => {
                println!("{}", "またね！".bright_green());
                break;
            }
            Command::Usage(usage) => {
                println!("{}", format!("使い方: {usage}").yellow());
                continue;
            }
            Command::History => {
                print_turns(&renderer, session.transcript().turns(), session.user_name());
                continue;
            }
            Command::Reset => {
                session.reset();
                tracing::info!(session_id = %session.id(), "Session reset");
                println!("{}", "会話をリセットしました。".bright_green());
                continue;
            }
            Command::Age(age) => {
                session.set_ai_age(age);
                println!("{}", format!("年齢を {} 歳にしました。", session.ai_age()).bright_green());
                continue;
            }
            Command::Name(name) => {
                session.set_user_name(&name);
                println!("{}", format!("名前を {} にしました。", session.user_name()).bright_green());
                continue;
            }
            Command::Quiz => service.start_quiz(&mut session).await,
            Command::Image(path) => {
                let bytes = match tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))
                {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        eprintln!("{}", format!("画像を読み込めませんでした: {e:#}").red());
                        continue;
                    }
                };
                let indicator = start_waiting_indicator();
                let turns = service.handle_image(&mut session, bytes).await;
                stop_waiting_indicator(indicator);
                if turns.is_empty() {
                    println!("{}", "同じ画像はすでに解析済みです。".bright_black());
                }
                turns
            }
            Command::Summary => {
                let indicator = start_waiting_indicator();
                let turns = service.summarize(&mut session).await;
                stop_waiting_indicator(indicator);
                turns
            }
            Command::Chat(text) => {
                let indicator = start_waiting_indicator();
                let turns = service.handle_input(&mut session, &text).await;
                stop_waiting_indicator(indicator);
                turns
            }
        };

        // The typed line is already on screen.
        let shown: Vec<Turn> = turns.into_iter().filter(|t| !t.is_user()).collect();
        print_turns(&renderer, &shown, session.user_name());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_failure_keeps_cause() {
        let cause = anyhow::anyhow!("Gemini API key not configured");
        let error = startup_failure(cause, Path::new("/tmp/tomodachi/secret.json"));

        assert_eq!(error.to_string(), "起動できませんでした");
        assert!(format!("{error:#}").contains("Gemini API key not configured"));
    }

    #[test]
    fn test_startup_hint_names_secret_file() {
        let hint = startup_hint(Path::new("/tmp/tomodachi/secret.json"));
        assert!(hint.starts_with("/tmp/tomodachi/secret.json に"));
        assert!(hint.contains("GEMINI_API_KEY"));
    }
}
