use std::sync::Arc;

use kbase_core::error::{Error, Result};
use kbase_core::traits::Generator;
use kbase_core::types::{Passage, Query};

use crate::pipeline::RetrievalPipeline;

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Generated { text: String, sources: Vec<Passage> },
    NoRelevantDocuments,
}

impl Answer {
    pub fn source_texts(&self) -> Vec<String> {
        match self {
            Answer::Generated { sources, .. } => sources.iter().map(|p| p.content.clone()).collect(),
            Answer::NoRelevantDocuments => Vec::new(),
        }
    }
}

pub fn build_prompt(question: &str, passages: &[Passage]) -> String {
    let context = passages.iter().map(|p| p.content.as_str()).collect::<Vec<_>>().join("\n\n");
    format!(
        "You are a professional assistant. Answer the user's question using the context below.\n\
         If the context is not enough to answer, say so clearly.\n\
         Keep the answer accurate and concise.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:"
    )
}

/// Retrieval followed by grounded generation.
pub struct AnswerService {
    pipeline: Arc<RetrievalPipeline>,
    generator: Arc<dyn Generator>,
}

impl AnswerService {
    pub fn new(pipeline: Arc<RetrievalPipeline>, generator: Arc<dyn Generator>) -> Self {
        Self { pipeline, generator }
    }

    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question must not be empty".into()));
        }
        let passages = self.pipeline.retrieve(&Query::new(question)).await?;
        if passages.is_empty() {
            tracing::info!("no relevant documents for question");
            return Ok(Answer::NoRelevantDocuments);
        }
        let reply = self.generator.generate(&build_prompt(question, &passages)).await?;
        Ok(Answer::Generated { text: reply.trim().to_string(), sources: passages })
    }
}
