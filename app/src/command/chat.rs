//! Interactive and single-shot persona chat.

use kaiwa_config::Config;
use kaiwa_conversation::{SessionStore, TurnOrchestrator};
use kaiwa_core::{CompletionOptions, Gender, Language, SessionConfig};
use kaiwa_providers::DeepSeekProvider;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Persona id selecting the role-played character
    pub persona: String,
    /// Voice delivery speed (participates in session identity)
    pub speed: f32,
    /// Reply language
    pub language: String,
    /// Speaker gender
    pub gender: String,
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for executing the Chat command.
///
/// Wires config → provider → session store → orchestrator, then runs either
/// a single turn or a stdin loop. The session lives for the process; the
/// orchestrator keeps every turn of the dialogue in context.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        let session_config = SessionConfig::new(input.persona, input.speed)
            .with_language(parse_language(&input.language)?)
            .with_gender(parse_gender(&input.gender)?);

        let provider = DeepSeekProvider::new(config.providers.deepseek.api_key.clone())
            .with_base_url(config.providers.deepseek.base_url.clone())
            .with_timeout(Duration::from_secs(config.chat.request_timeout_secs));

        let options = CompletionOptions::default()
            .with_model(input.model.unwrap_or_else(|| config.chat.model.clone()))
            .with_max_tokens(config.chat.max_tokens)
            .with_temperature(config.chat.temperature);

        let orchestrator = TurnOrchestrator::new(
            Arc::new(provider),
            Arc::new(SessionStore::new()),
            options,
        )
        .with_timeout(Duration::from_secs(config.chat.request_timeout_secs));

        info!(
            "Starting session {} ({})",
            SessionStore::identity_of(&session_config),
            input.language
        );

        if let Some(message) = input.message {
            let reply = orchestrator.respond(&message, &session_config).await?;
            println!("{}", reply.reply);
        } else {
            run_interactive(&orchestrator, &session_config).await?;
        }

        Ok(())
    }
}

/// Stdin/stdout conversation loop. Context accumulates across turns for as
/// long as the process runs.
async fn run_interactive(
    orchestrator: &TurnOrchestrator,
    session_config: &SessionConfig,
) -> anyhow::Result<()> {
    println!(
        "=== Session: {} ===",
        SessionStore::identity_of(session_config)
    );
    println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input, "exit" | "quit" | "q") {
            break;
        }

        if input.is_empty() {
            continue;
        }

        match orchestrator.respond(input, session_config).await {
            Ok(reply) => println!("\n{}\n", reply.reply),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    let turns = orchestrator
        .store()
        .transcript(&SessionStore::identity_of(session_config))
        .map_or(0, |t| t.len());
    println!("\nSession ended. Total turns: {}", turns.saturating_sub(1) / 2);
    Ok(())
}

fn parse_language(raw: &str) -> anyhow::Result<Language> {
    match raw.to_ascii_lowercase().as_str() {
        "chinese" | "zh" => Ok(Language::Chinese),
        "english" | "en" => Ok(Language::English),
        other => anyhow::bail!("unsupported language: {other} (expected chinese or english)"),
    }
}

fn parse_gender(raw: &str) -> anyhow::Result<Gender> {
    match raw.to_ascii_lowercase().as_str() {
        "female" | "f" => Ok(Gender::Female),
        "male" | "m" => Ok(Gender::Male),
        other => anyhow::bail!("unsupported gender: {other} (expected female or male)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_aliases() {
        assert!(matches!(parse_language("Chinese"), Ok(Language::Chinese)));
        assert!(matches!(parse_language("en"), Ok(Language::English)));
        assert!(parse_language("klingon").is_err());
    }

    #[test]
    fn parses_gender_aliases() {
        assert!(matches!(parse_gender("FEMALE"), Ok(Gender::Female)));
        assert!(matches!(parse_gender("m"), Ok(Gender::Male)));
        assert!(parse_gender("other").is_err());
    }
}
