//! Two-stage generation orchestrator.
//!
//! Every reply is produced by two sequential model calls: an analyst
//! model breaks down the customer's intent and strategy, then a
//! persona model drafts the actual reply in a salesperson's voice.
//! The orchestrator merges both, optionally with a price-reference
//! block when the inbound message touches on pricing.

use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use serde::Serialize;
use tracing::info;

use sales_copilot_core::annotate::annotate_case;
use sales_copilot_core::models::{RetrievalResult, Role};
use sales_copilot_core::prompt::content_after_marker;
use sales_copilot_core::signals::{
    detect_price_sensitive, extract_dominant_product, extract_price_reference,
};

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::llm::GenerationClient;
use crate::retrieval::BuiltPrompt;

/// Maximum number of annotated cases surfaced in a stream's opening
/// event.
const STREAM_CASE_LIMIT: usize = 3;

/// Content preview length (in characters) for streamed cases.
const CASE_PREVIEW_CHARS: usize = 200;

/// A retrieved case decorated with a one-line strategy annotation,
/// ready to show alongside the generated reply.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedCase {
    pub product: String,
    pub role: String,
    pub content: String,
    pub analysis: String,
}

/// Events emitted by [`Orchestrator::generate_stream`], in order:
/// `Cases`, then `Chunk`, then `Done`. Any failure after the cases
/// have been sent replaces the rest of the stream with one terminal
/// `Error` event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum StreamEvent {
    Cases(Vec<AnnotatedCase>),
    Chunk(String),
    Done,
    Error(String),
}

/// Drives the analyst and persona models and assembles their output.
pub struct Orchestrator {
    client: GenerationClient,
    analyst_model: String,
    sales_model: String,
}

fn analysis_instructions(product: &str) -> String {
    format!(
        "你是跨境电商培训师，分析客户问题并给出策略建议。\n\
         当前咨询产品：{product}\n\n\
         请按以下格式回复（简洁）：\n\n\
         **客户心理**：一句话说明客户在想什么\n\n\
         **应对思路**：\n\
         - 要点1\n\
         - 要点2\n\n\
         **底线提醒**：不能让步的是什么\n\n\
         **避坑提醒**：\n\
         - 这种情况下新手容易犯什么错误\n\
         - 千万不要说什么话"
    )
}

fn sales_instructions(product: &str, user_message: &str) -> String {
    format!(
        "你是经验丰富的跨境电商销售员，说话要有人味。\n\
         当前产品：{product}\n\n\
         客户说：{user_message}\n\n\
         请直接给出回复话术，要求：\n\
         - 用\"哈\"、\"嘛\"、\"呀\"等语气词\n\
         - 中英文混用自然\n\
         - 有底线但不生硬"
    )
}

fn annotate_results(results: &[RetrievalResult]) -> Vec<AnnotatedCase> {
    results
        .iter()
        .take(STREAM_CASE_LIMIT)
        .map(|r| {
            let role = r.metadata.role.unwrap_or(Role::Seller);
            // Annotate and preview the message body only, not the
            // field-marker prefix of the stored document.
            let content = content_after_marker(&r.document);
            AnnotatedCase {
                product: r.metadata.product.clone(),
                role: role.as_str().to_string(),
                content: content.chars().take(CASE_PREVIEW_CHARS).collect(),
                analysis: annotate_case(role, content).to_string(),
            }
        })
        .collect()
}

impl Orchestrator {
    pub fn new(client: GenerationClient, config: &LlmConfig) -> Self {
        Self {
            client,
            analyst_model: config.analyst_model.clone(),
            sales_model: config.sales_model.clone(),
        }
    }

    /// Produce a complete advisory reply for one customer message.
    ///
    /// Runs the analyst model first, then the persona model, and
    /// merges both into the sectioned output format. Fails fast if
    /// either model call fails; nothing partial is returned.
    pub async fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        if user_message.trim().is_empty() {
            return Err(Error::EmptyInput("message"));
        }

        let product = extract_dominant_product(system_prompt);
        info!(product = %product, "generating advisory reply");

        let analysis = self
            .client
            .chat(
                &self.analyst_model,
                &analysis_instructions(&product),
                user_message,
            )
            .await?;

        let sales_reply = self
            .client
            .chat(
                &self.sales_model,
                &sales_instructions(&product, user_message),
                user_message,
            )
            .await?;

        let mut price_info = String::new();
        if detect_price_sensitive(user_message) {
            if let Some(price_ref) = extract_price_reference(system_prompt) {
                price_info = format!(
                    "\n\n---\n\n## [价格参考]\n\n{price_ref}\n\n\
                     > 注：以上价格来自历史成交案例，实际价格请根据数量和当前市场情况调整"
                );
            }
        }

        Ok(format!(
            "## [相关产品: {product}]\n\n---\n\n## [建议回复]\n\n{sales_reply}\n\n---\n\n\
             ## [策略分析]\n\n{analysis}{price_info}"
        ))
    }

    /// Streamed variant of [`generate`](Self::generate).
    ///
    /// Emits the annotated top cases immediately so a consumer can
    /// render them while the models run, then the full reply as a
    /// single chunk, then `Done`.
    pub fn generate_stream(
        self: Arc<Self>,
        prompt: BuiltPrompt,
    ) -> impl Stream<Item = StreamEvent> {
        stream! {
            yield StreamEvent::Cases(annotate_results(&prompt.results));

            match self.generate(&prompt.system_prompt, &prompt.query).await {
                Ok(reply) => {
                    yield StreamEvent::Chunk(reply);
                    yield StreamEvent::Done;
                }
                Err(e) => {
                    yield StreamEvent::Error(e.to_string());
                }
            }
        }
    }
}
