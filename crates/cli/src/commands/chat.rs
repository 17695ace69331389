//! Chat command handler.
//!
//! A line-oriented loop against the agent. The session id returned by the
//! agent is passed back on every following turn.

use super::require_api_key;
use aixp_agent::{build_agent, AgentRuntime};
use aixp_core::{config::AppConfig, i18n, AppResult};
use aixp_knowledge::SlackNotifier;
use clap::Args;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Inputs that end the loop, compared trimmed and lowercased.
const EXIT_WORDS: [&str; 4] = ["/exit", "exit", ":q", "quit"];

fn is_exit(line: &str) -> bool {
    EXIT_WORDS.contains(&line.trim().to_lowercase().as_str())
}

/// Interactive back-and-forth chat with the agent
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Optional initial message
    #[arg(long, default_value = "")]
    pub initial: String,

    /// Language for CLI prompts (en, ar)
    #[arg(long, default_value = "en")]
    pub lang: String,
}

/// Agent conversation with session threading.
pub(crate) struct ChatSession {
    agent: Arc<dyn AgentRuntime>,
    session_id: Option<String>,
}

impl ChatSession {
    pub(crate) fn new(agent: Arc<dyn AgentRuntime>) -> Self {
        Self {
            agent,
            session_id: None,
        }
    }

    /// Send one message; keeps the previous session when the reply has none.
    pub(crate) async fn send(&mut self, text: &str) -> AppResult<String> {
        let response = self.agent.run(text, self.session_id.as_deref()).await?;

        if let Some(session_id) = response.session_id() {
            if self.session_id.as_deref() != Some(session_id) {
                tracing::debug!("Chat session: {}", session_id);
            }
            self.session_id = Some(session_id.to_string());
        }

        Ok(response.text())
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");
        require_api_key(config, &self.lang)?;

        let mut session = ChatSession::new(build_agent(config).await?);
        let notifier = SlackNotifier::new(config.slack_webhook.clone())?;
        notifier.notify("Chat session started").await;

        if !self.initial.is_empty() {
            println!("{}", session.send(&self.initial).await?);
        }

        println!("{}", i18n::t("chat.exit_hint", &self.lang));
        let prompt = i18n::t("chat.prompt", &self.lang);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{}", prompt);
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if is_exit(&line) {
                break;
            }

            match session.send(&line).await {
                Ok(reply) => println!("{}", reply),
                Err(e) => {
                    tracing::warn!("Agent run failed: {}", e);
                    eprintln!("Error: {}", e);
                }
            }
        }

        notifier.notify("Chat session ended").await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aixp_agent::AgentResponse;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with a scripted session id per turn and records the ids it saw.
    struct ScriptedAgent {
        replies: Mutex<Vec<serde_json::Value>>,
        seen: Mutex<Vec<Option<String>>>,
    }

    #[async_trait::async_trait]
    impl AgentRuntime for ScriptedAgent {
        fn agent_id(&self) -> &str {
            "scripted"
        }

        async fn run(&self, _prompt: &str, session_id: Option<&str>) -> AppResult<AgentResponse> {
            self.seen.lock().unwrap().push(session_id.map(str::to_string));
            Ok(AgentResponse(self.replies.lock().unwrap().remove(0)))
        }
    }

    #[test]
    fn test_exit_words() {
        for word in ["/exit", "exit", ":q", "quit", "  QUIT  ", "Exit"] {
            assert!(is_exit(word), "{}", word);
        }
        assert!(!is_exit("exit now"));
        assert!(!is_exit("hello"));
    }

    #[tokio::test]
    async fn test_session_id_is_threaded() {
        let agent = Arc::new(ScriptedAgent {
            replies: Mutex::new(vec![
                json!({"data": {"output": "hi", "session_id": "s-1"}}),
                json!({"data": {"output": "again"}}),
                json!("plain"),
            ]),
            seen: Mutex::new(Vec::new()),
        });
        let mut session = ChatSession::new(agent.clone());

        assert_eq!(session.send("hello").await.unwrap(), "hi");
        assert_eq!(session.send("more").await.unwrap(), "again");
        assert_eq!(session.send("last").await.unwrap(), "plain");

        assert_eq!(
            *agent.seen.lock().unwrap(),
            vec![None, Some("s-1".to_string()), Some("s-1".to_string())]
        );
    }
}
