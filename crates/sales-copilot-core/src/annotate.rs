//! Case annotation rules.
//!
//! Given a retrieved case's role and content, produce a one-line
//! tactical annotation via ordered keyword rules — first matching rule
//! wins. This is descriptive tagging over a bilingual term list, not
//! sentiment analysis.

use crate::models::Role;

/// Buyer-intent rules, checked in order against lowercased content.
const BUYER_RULES: &[(&[&str], &str)] = &[
    (
        &["discount", "折扣", "优惠", "便宜"],
        "买家策略: 价格谈判，试探底价空间",
    ),
    (
        &["quality", "质量", "品质"],
        "买家关注: 产品质量，需要建立信任",
    ),
    (
        &["competitor", "竞争", "别家", "其他"],
        "买家策略: 用竞品压价，需强调差异化",
    ),
    (
        &["long-term", "长期", "合作"],
        "买家意图: 以长期合作换取优惠",
    ),
    (
        &["urgent", "急", "马上"],
        "买家状态: 有紧迫需求，成交意向高",
    ),
];

const BUYER_FALLBACK: &str = "买家诉求: 了解产品/价格信息";

/// Seller-strategy rules, checked in order against lowercased content.
const SELLER_RULES: &[(&[&str], &str)] = &[
    (
        &["best offer", "最低", "底价"],
        "卖家策略: 表明底线，促成成交",
    ),
    (
        &["discount", "折扣", "%"],
        "卖家策略: 适度让步，给出优惠方案",
    ),
    (
        &["quality", "质量", "品质"],
        "卖家策略: 强调价值，转移价格焦点",
    ),
    (
        &["long-term", "长期"],
        "卖家策略: 用长期合作换取当前让步",
    ),
    (
        &["confirm", "确认", "下单"],
        "卖家策略: 推动成交，锁定订单",
    ),
];

const SELLER_FALLBACK: &str = "卖家策略: 维护关系，保持沟通";

/// Produce a one-line annotation for a retrieved case.
pub fn annotate_case(role: Role, content: &str) -> &'static str {
    let lower = content.to_lowercase();
    let (rules, fallback) = match role {
        Role::Buyer => (BUYER_RULES, BUYER_FALLBACK),
        Role::Seller => (SELLER_RULES, SELLER_FALLBACK),
    };

    rules
        .iter()
        .find(|(terms, _)| terms.iter().any(|t| lower.contains(t)))
        .map(|(_, annotation)| *annotation)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_price_probe() {
        assert_eq!(
            annotate_case(Role::Buyer, "Can I get a DISCOUNT?"),
            "买家策略: 价格谈判，试探底价空间"
        );
        assert_eq!(
            annotate_case(Role::Buyer, "能不能便宜点"),
            "买家策略: 价格谈判，试探底价空间"
        );
    }

    #[test]
    fn test_buyer_first_match_wins() {
        // Mentions both discount and quality; the discount rule is
        // checked first.
        assert_eq!(
            annotate_case(Role::Buyer, "有折扣吗？质量怎么样"),
            "买家策略: 价格谈判，试探底价空间"
        );
    }

    #[test]
    fn test_buyer_fallback() {
        assert_eq!(
            annotate_case(Role::Buyer, "请介绍一下参数"),
            "买家诉求: 了解产品/价格信息"
        );
    }

    #[test]
    fn test_seller_floor_price() {
        assert_eq!(
            annotate_case(Role::Seller, "This is my best offer"),
            "卖家策略: 表明底线，促成成交"
        );
        assert_eq!(
            annotate_case(Role::Seller, "这已经是底价了"),
            "卖家策略: 表明底线，促成成交"
        );
    }

    #[test]
    fn test_seller_close_and_fallback() {
        assert_eq!(
            annotate_case(Role::Seller, "请确认订单"),
            "卖家策略: 推动成交，锁定订单"
        );
        assert_eq!(
            annotate_case(Role::Seller, "保持联系"),
            "卖家策略: 维护关系，保持沟通"
        );
    }
}
