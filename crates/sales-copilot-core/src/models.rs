//! Core data models for the negotiation dialogue corpus.
//!
//! These types represent the recorded dialogue turns, the documents
//! stored in the corpus index, and the search results that flow through
//! the retrieval and generation pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Speaker role within a negotiation, normalized at the ingestion
/// boundary. Raw corpus records may carry localized labels; downstream
/// code never branches on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    /// Normalize a raw role label. Accepts the canonical English values
    /// and the localized labels observed in historical exports.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim() {
            "buyer" | "买家" | "客户" => Some(Role::Buyer),
            "seller" | "卖家" | "客服" => Some(Role::Seller),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }

    /// Display label used in conversation-level document text.
    pub fn label_cn(&self) -> &'static str {
        match self {
            Role::Buyer => "客户",
            Role::Seller => "客服",
        }
    }

    /// Ordering rank within a round: buyer speaks before seller.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Buyer => 0,
            Role::Seller => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded message of a historical negotiation. Turns sharing an
/// `id` belong to the same conversation and are totally ordered by
/// `(round, role rank)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTurn {
    /// Conversation identifier, shared across turns of one negotiation.
    pub id: i64,
    pub product: String,
    /// 1-based negotiation stage: inquiry, negotiation, close.
    pub round: i64,
    pub role: Role,
    pub content: String,
}

/// Metadata attached to an indexed document. Turn-level documents carry
/// `role`, `round`, and `dialogue_id`; conversation-level documents
/// carry `dialogue_id` and the aggregate `rounds` count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseMetadata {
    pub product: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<i64>,
}

/// Unit stored in the corpus index: text to embed plus metadata.
/// Ids are unique within a collection; re-adding an existing id is a
/// caller error, not an upsert.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub id: String,
    pub text: String,
    pub metadata: CaseMetadata,
}

/// A nearest-neighbor hit returned by a corpus index query.
///
/// `distance` is cosine distance: 0 = identical direction, smaller =
/// more similar. Result sets are ordered by non-decreasing distance.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub document: String,
    pub metadata: CaseMetadata,
    pub distance: f64,
}

/// Build a turn-level document from one dialogue turn.
///
/// The document text carries the field markers the prompt assembler
/// and signal extractor rely on (including the 内容: content marker).
pub fn turn_document(id: impl Into<String>, turn: &DialogueTurn) -> IndexedDocument {
    IndexedDocument {
        id: id.into(),
        text: format!(
            "产品:{} 角色:{} 轮次:{} 内容:{}",
            turn.product, turn.role, turn.round, turn.content
        ),
        metadata: CaseMetadata {
            product: turn.product.clone(),
            role: Some(turn.role),
            round: Some(turn.round),
            dialogue_id: Some(turn.id),
            rounds: None,
        },
    }
}

/// Build conversation-level documents: one per conversation id, with
/// turns concatenated in `(round, role rank)` order and a `rounds`
/// aggregate in the metadata. Ids take the form `conv_{id}`.
pub fn conversation_documents(turns: &[DialogueTurn]) -> Vec<IndexedDocument> {
    let mut grouped: BTreeMap<i64, Vec<&DialogueTurn>> = BTreeMap::new();
    for turn in turns {
        grouped.entry(turn.id).or_default().push(turn);
    }

    grouped
        .into_iter()
        .map(|(conv_id, mut conv_turns)| {
            conv_turns.sort_by_key(|t| (t.round, t.role.rank()));

            let product = conv_turns
                .first()
                .map(|t| t.product.clone())
                .unwrap_or_default();

            let mut lines = vec![format!("产品: {}", product)];
            for t in &conv_turns {
                lines.push(format!("{}: {}", t.role.label_cn(), t.content));
            }

            let mut rounds: Vec<i64> = conv_turns.iter().map(|t| t.round).collect();
            rounds.sort_unstable();
            rounds.dedup();

            IndexedDocument {
                id: format!("conv_{}", conv_id),
                text: lines.join("\n"),
                metadata: CaseMetadata {
                    product,
                    role: None,
                    round: None,
                    dialogue_id: Some(conv_id),
                    rounds: Some(rounds.len() as i64),
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(id: i64, round: i64, role: Role, content: &str) -> DialogueTurn {
        DialogueTurn {
            id,
            product: "充电宝".to_string(),
            round,
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_role_parse_normalizes_localized_labels() {
        assert_eq!(Role::parse("buyer"), Some(Role::Buyer));
        assert_eq!(Role::parse("买家"), Some(Role::Buyer));
        assert_eq!(Role::parse("客户"), Some(Role::Buyer));
        assert_eq!(Role::parse("seller"), Some(Role::Seller));
        assert_eq!(Role::parse("客服"), Some(Role::Seller));
        assert_eq!(Role::parse("observer"), None);
    }

    #[test]
    fn test_turn_document_text_and_metadata() {
        let doc = turn_document("doc_0", &turn(7, 1, Role::Buyer, "太贵了"));
        assert_eq!(doc.id, "doc_0");
        assert_eq!(doc.text, "产品:充电宝 角色:buyer 轮次:1 内容:太贵了");
        assert_eq!(doc.metadata.role, Some(Role::Buyer));
        assert_eq!(doc.metadata.round, Some(1));
        assert_eq!(doc.metadata.dialogue_id, Some(7));
        assert_eq!(doc.metadata.rounds, None);
    }

    #[test]
    fn test_conversation_documents_order_and_rounds() {
        // Deliberately shuffled: seller round 1 before buyer round 1.
        let turns = vec![
            turn(3, 1, Role::Seller, "最低 $9"),
            turn(3, 2, Role::Buyer, "能便宜点吗"),
            turn(3, 1, Role::Buyer, "多少钱"),
        ];

        let docs = conversation_documents(&turns);
        assert_eq!(docs.len(), 1);

        let doc = &docs[0];
        assert_eq!(doc.id, "conv_3");
        let lines: Vec<&str> = doc.text.lines().collect();
        assert_eq!(lines[0], "产品: 充电宝");
        assert_eq!(lines[1], "客户: 多少钱");
        assert_eq!(lines[2], "客服: 最低 $9");
        assert_eq!(lines[3], "客户: 能便宜点吗");
        assert_eq!(doc.metadata.rounds, Some(2));
        assert_eq!(doc.metadata.role, None);
    }

    #[test]
    fn test_conversation_documents_one_per_id() {
        let turns = vec![
            turn(1, 1, Role::Buyer, "a"),
            turn(2, 1, Role::Buyer, "b"),
            turn(1, 2, Role::Seller, "c"),
        ];
        let docs = conversation_documents(&turns);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "conv_1");
        assert_eq!(docs[1].id, "conv_2");
    }
}
