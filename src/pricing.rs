//! Character-based pricing and cost estimation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPricing {
    pub provider: String,
    pub cost_per_1k_chars: f64,
    pub currency: String,
}

impl CharacterPricing {
    pub fn new(provider: &str, cost_per_1k_chars: f64) -> Self {
        Self {
            provider: provider.into(),
            cost_per_1k_chars,
            currency: "USD".into(),
        }
    }

    pub fn fish_audio() -> Self {
        Self::new("fish_audio", 0.015)
    }

    pub fn for_provider(provider: &str) -> Option<Self> {
        match provider.to_lowercase().as_str() {
            "fish_audio" | "fish audio" => Some(Self::fish_audio()),
            _ => None,
        }
    }

    /// Cost of `text`, counted in Unicode scalar values.
    pub fn estimate(&self, text: &str) -> CostEstimate {
        let chars = text.chars().count() as u64;
        CostEstimate {
            provider: self.provider.clone(),
            chars,
            total_cost: chars as f64 / 1000.0 * self.cost_per_1k_chars,
            currency: self.currency.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub provider: String,
    pub chars: u64,
    pub total_cost: f64,
    pub currency: String,
}

impl CostEstimate {
    /// `~$0.01 (N chars)` below one cent, `~$X.XXX (N chars)` otherwise.
    pub fn format(&self) -> String {
        let chars = group_thousands(self.chars);
        if self.total_cost < 0.01 {
            format!("~$0.01 ({} chars)", chars)
        } else {
            format!("~${:.3} ({} chars)", self.total_cost, chars)
        }
    }
}

pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_texts_round_up_to_a_cent() {
        let est = CharacterPricing::fish_audio().estimate("hello world");
        assert_eq!(est.chars, 11);
        assert_eq!(est.format(), "~$0.01 (11 chars)");
    }

    #[test]
    fn test_larger_texts_show_three_decimals() {
        let text = "a".repeat(12_345);
        let est = CharacterPricing::fish_audio().estimate(&text);
        assert!((est.total_cost - 0.185175).abs() < 1e-9);
        assert_eq!(est.format(), "~$0.185 (12,345 chars)");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_unknown_provider() {
        assert!(CharacterPricing::for_provider("elevenlabs").is_none());
        assert!(CharacterPricing::for_provider("Fish_Audio").is_some());
    }
}
