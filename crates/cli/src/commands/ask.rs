//! Ask command handler.
//!
//! Answers a question from index contexts (plus external legal sources when
//! the question calls for them) through the configured agent.

use super::{print_json, require_api_key};
use aixp_agent::build_agent;
use aixp_core::{config::AppConfig, AppResult};
use aixp_knowledge::{create_index_service, rag, AskOptions, ContextAugmenter, RagAnswer};
use clap::Args;

/// Answer a question grounded in an index
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Index ID or name
    pub index: String,

    /// Question text
    pub question: String,

    /// Number of contexts to use
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command on index '{}'", self.index);
        require_api_key(config, &config.lang)?;

        let agent = build_agent(config).await?;
        let index = create_index_service(config)?;
        let augmenter = ContextAugmenter::from_config(config)?;

        let options = AskOptions::new(&self.index, &self.question).with_top_k(self.top_k);
        let result = rag::answer(agent.as_ref(), index.as_ref(), &augmenter, options).await?;

        if self.json {
            print_json(&result)
        } else {
            print_answer(&result);
            Ok(())
        }
    }
}

/// Human-readable answer with one line per citation.
pub(crate) fn print_answer(result: &RagAnswer) {
    println!("Answer:");
    println!("{}", result.answer);
    println!();

    if result.citations.is_empty() {
        println!("Citations: (none)");
    } else {
        println!("Citations:");
        for citation in &result.citations {
            println!("- {}: {}", citation.source, citation.snippet);
        }
    }
}
