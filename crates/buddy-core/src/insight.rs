//! Insight prompt assembly
//!
//! Builds the single prompt string sent to the completion gateway. Section
//! order is fixed: question, domain restriction, spending context, optional
//! category focus, optional new-item note, output-format constraints. The
//! spending block uses a fixed line format that `parse_spending_block` can
//! read back.

use crate::stats::SpendingStats;

/// Lead-in used when the caller asks for tips rather than posing a question
pub const DEFAULT_TIPS_QUESTION: &str =
    "Give 1-2 short personalized budget tips based on the following information:";

/// Keeps the model on budget topics; off-topic questions get a canned refusal
pub const DOMAIN_RESTRICTION: &str = "Only respond to questions related to this budget \
     information. If the question is in any way unrelated, say 'Sorry, please ask questions \
     related to budget info.'";

/// Output shape the response renderer expects
pub const OUTPUT_CONSTRAINTS: &str = "Do not include any tables. Do not number every line. \
     Return only the response itself, with no introduction or conclusion. Do not use markdown \
     formatting like **bold** or *italic*. Do not respond to these requirements.";

/// Builder for one gateway prompt
#[derive(Debug, Clone, Default)]
pub struct InsightRequest {
    question: Option<String>,
    category_totals: Vec<(String, f64)>,
    total_spent: f64,
    monthly_budget: f64,
    focus_category: Option<(String, f64)>,
    examples: Vec<(String, f64)>,
    new_item: Option<(String, String, f64)>,
}

impl InsightRequest {
    /// Start a request from aggregated spending plus the monthly budget
    pub fn from_stats(stats: &SpendingStats, monthly_budget: f64) -> Self {
        Self {
            category_totals: stats
                .category_totals
                .iter()
                .map(|c| (c.category.clone(), c.total))
                .collect(),
            total_spent: stats.total_spent,
            monthly_budget,
            ..Self::default()
        }
    }

    /// Set the user's question; omitted means the default tips lead-in
    pub fn question(mut self, question: &str) -> Self {
        self.question = Some(question.to_string());
        self
    }

    /// Focus the tips on one category with its summed total
    pub fn focus_category(mut self, category: &str, total: f64) -> Self {
        self.focus_category = Some((category.to_string(), total));
        self
    }

    /// Example items from the focused category, capped at 5
    pub fn examples(mut self, items: &[(String, f64)]) -> Self {
        self.examples = items.iter().take(5).cloned().collect();
        self
    }

    /// Note an expense the user just added
    pub fn new_item(mut self, name: &str, category: &str, cost: f64) -> Self {
        self.new_item = Some((name.to_string(), category.to_string(), cost));
        self
    }

    /// Assemble the prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        match &self.question {
            Some(q) => prompt.push_str(q),
            None => prompt.push_str(DEFAULT_TIPS_QUESTION),
        }
        prompt.push_str("\n\n");
        prompt.push_str(DOMAIN_RESTRICTION);

        prompt.push_str("\n\nCurrent spending by category:\n");
        for (category, total) in &self.category_totals {
            prompt.push_str(&format!("- {}: ${:.2}\n", category, total));
        }
        prompt.push_str(&format!("Total spending: ${:.2}\n", self.total_spent));
        prompt.push_str(&format!("Monthly budget: ${:.2}\n", self.monthly_budget));

        if let Some((category, total)) = &self.focus_category {
            prompt.push_str(&format!("\nSpending on {}: ${:.2}\n", category, total));
            if !self.examples.is_empty() {
                prompt.push_str(&format!("Recent {} expenses:\n", category));
                for (name, cost) in &self.examples {
                    prompt.push_str(&format!("- {}: ${:.2}\n", name, cost));
                }
            }
        }

        if let Some((name, category, cost)) = &self.new_item {
            prompt.push_str(&format!(
                "\nNew expense just added: {} (Category: {}) for ${:.2}\n",
                name, category, cost
            ));
        }

        if let Some((category, _)) = &self.focus_category {
            prompt.push_str(&format!(
                "Focus your tips on {} spending and be specific.\n",
                category
            ));
        }

        prompt.push('\n');
        prompt.push_str(OUTPUT_CONSTRAINTS);
        prompt
    }
}

/// Read the `- category: $amount` lines back out of a spending block
///
/// Inverse of the block `build` emits; lines that don't match the fixed
/// format are skipped.
pub fn parse_spending_block(text: &str) -> Vec<(String, f64)> {
    let mut pairs = Vec::new();
    for line in text.lines() {
        let Some(rest) = line.strip_prefix("- ") else {
            continue;
        };
        let Some((label, amount)) = rest.rsplit_once(": $") else {
            continue;
        };
        if let Ok(value) = amount.trim().parse::<f64>() {
            pairs.push((label.to_string(), value));
        }
    }
    pairs
}
