//! Demo command handler.
//!
//! Walks through the whole flow once: agent hello, a demo index with two
//! documents (plus the course PDF when present), a search and a RAG answer.

use super::ask::print_answer;
use super::require_api_key;
use aixp_agent::build_agent;
use aixp_core::{config::AppConfig, AppResult};
use aixp_knowledge::{
    create_index_service, rag, AskOptions, Chunk, ChunkMeta, ContextAugmenter, Ingestor,
};
use clap::Args;

const DEMO_INDEX: &str = "demo-index";
const DEMO_QUESTION: &str = "What is agentic RAG?";
const DEMO_PDF: &str = "Certification-Course-Project.pdf";
const DEMO_TOP_K: usize = 3;

const DEMO_DOCUMENTS: [(&str, &str); 2] = [
    ("1", "aiXplain lets you build agents quickly."),
    ("2", "Agentic RAG combines retrieval with tool use."),
];

/// Run the end-to-end demo
#[derive(Args, Debug)]
pub struct DemoCommand {}

fn demo_chunks() -> Vec<Chunk> {
    DEMO_DOCUMENTS
        .iter()
        .map(|(id, text)| Chunk {
            id: id.to_string(),
            text: text.to_string(),
            meta: ChunkMeta {
                source: "demo".to_string(),
                page: None,
                row: None,
            },
        })
        .collect()
}

impl DemoCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing demo command");
        require_api_key(config, &config.lang)?;

        let agent = build_agent(config).await?;
        println!("Running agent...");
        let hello = agent.run("Say hello and confirm you're alive.", None).await?;
        println!("{}", hello.text());

        let index = create_index_service(config)?;
        let info = index.create(DEMO_INDEX, "Temporary demo index").await?;
        println!("Created index: {}", serde_json::to_string(&info)?);

        let count = index.ingest(&info.id, &demo_chunks()).await?;
        println!("Ingested {} documents", count);

        let pdf = config.workspace.join(DEMO_PDF);
        if pdf.exists() {
            let ingested = match Ingestor::from_config(index.clone(), config) {
                Ok(ingestor) => ingestor.ingest_pdf(&info.id, &pdf, true).await,
                Err(e) => Err(e),
            };
            match ingested {
                Ok(stats) => println!(
                    "Ingested {} chunks from {} pages of {}",
                    stats.chunks_ingested, stats.units_ingested, DEMO_PDF
                ),
                Err(e) => println!("PDF ingest skipped: {}", e),
            }
        }

        let results = index.search(&info.id, DEMO_QUESTION, DEMO_TOP_K).await?;
        println!("Search results: {}", serde_json::to_string_pretty(&results)?);

        let augmenter = ContextAugmenter::from_config(config)?;
        let options = AskOptions::new(&info.id, DEMO_QUESTION).with_top_k(DEMO_TOP_K);
        let answer = rag::answer(agent.as_ref(), index.as_ref(), &augmenter, options).await?;
        print_answer(&answer);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_chunks() {
        let chunks = demo_chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].id, "2");
        assert!(chunks[1].text.starts_with("Agentic RAG"));
        assert_eq!(chunks[0].meta.source, "demo");
    }
}
