//! Prompt assembly for the retrieval-augmented pipeline.
//!
//! Formats retrieved cases into fixed-shape case blocks and weaves them
//! into the system-prompt template. Rebuilt on every request; nothing
//! here is cached.

use crate::models::RetrievalResult;

/// Marker separating the field prefix from the message body in
/// turn-level document text.
pub const CONTENT_MARKER: &str = "内容:";

/// The substring of a stored document following the last content
/// marker; the whole document when the marker is absent.
pub fn content_after_marker(document: &str) -> &str {
    document
        .rsplit_once(CONTENT_MARKER)
        .map(|(_, content)| content)
        .unwrap_or(document)
}

/// Format one retrieved case into the fixed case block.
///
/// Turn-level documents only: conversation-level documents are not
/// rendered as case blocks. Missing role/round fields render as `-`.
pub fn format_case(index: usize, result: &RetrievalResult) -> String {
    let role = result
        .metadata
        .role
        .map(|r| r.as_str())
        .unwrap_or("-");
    let round = result
        .metadata
        .round
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "案例 {}:\n  产品: {}\n  角色: {}\n  轮次: {}\n  内容: {}",
        index,
        result.metadata.product,
        role,
        round,
        content_after_marker(&result.document)
    )
}

/// Join case blocks with blank-line separators. An empty result list
/// yields an empty context, which is not an error.
pub fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format_case(i + 1, r))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Interpolate the assembled context into the system-prompt template.
pub fn render_system_prompt(context: &str) -> String {
    format!(
        "参考这些真实对话案例来回答问题：\n\n{}\n\n---\n\n根据以上案例，回答客服的问题。",
        context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseMetadata, Role};

    fn result(document: &str) -> RetrievalResult {
        RetrievalResult {
            document: document.to_string(),
            metadata: CaseMetadata {
                product: "充电宝".to_string(),
                role: Some(Role::Buyer),
                round: Some(1),
                dialogue_id: Some(7),
                rounds: None,
            },
            distance: 0.1,
        }
    }

    #[test]
    fn test_content_after_marker() {
        assert_eq!(
            content_after_marker("产品:充电宝 角色:buyer 轮次:1 内容:太贵了"),
            "太贵了"
        );
        // No marker: the whole document passes through.
        assert_eq!(content_after_marker("plain text"), "plain text");
    }

    #[test]
    fn test_format_case_shape() {
        let block = format_case(1, &result("产品:充电宝 角色:buyer 轮次:1 内容:太贵了"));
        assert_eq!(
            block,
            "案例 1:\n  产品: 充电宝\n  角色: buyer\n  轮次: 1\n  内容: 太贵了"
        );
    }

    #[test]
    fn test_build_context_blank_line_separated() {
        let results = vec![
            result("产品:充电宝 角色:buyer 轮次:1 内容:太贵了"),
            result("产品:充电宝 角色:buyer 轮次:2 内容:再便宜点"),
        ];
        let context = build_context(&results);
        assert!(context.starts_with("案例 1:"));
        assert!(context.contains("\n\n案例 2:"));
    }

    #[test]
    fn test_empty_results_still_render() {
        let prompt = render_system_prompt(&build_context(&[]));
        assert!(prompt.starts_with("参考这些真实对话案例来回答问题："));
        assert!(prompt.ends_with("根据以上案例，回答客服的问题。"));
    }
}
