//! Keyword-based ticket classification.
//!
//! Scoring is phrase containment on the lower-cased subject and description:
//! each dictionary phrase found anywhere in the text counts once. The result is
//! a pure function of the text apart from the `classified_at` stamp.

use crate::domain::model::{Category, ClassificationResult, Priority, Ticket};
use chrono::Utc;

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::AccountAccess,
        &[
            "login", "password", "signin", "sign-in", "sign in", "2fa", "two-factor",
            "authentication", "authorize", "access", "locked out", "reset password",
            "forgot password", "can't login", "cannot login", "account locked",
        ],
    ),
    (
        Category::TechnicalIssue,
        &[
            "bug", "error", "crash", "not working", "broken", "issue", "problem", "fail",
            "failed", "failure", "exception", "500", "404", "timeout", "slow", "performance",
            "down", "outage", "unavailable",
        ],
    ),
    (
        Category::BillingQuestion,
        &[
            "payment", "invoice", "refund", "charge", "billing", "subscription", "credit card",
            "paypal", "price", "cost", "fee", "discount", "coupon", "trial", "upgrade",
            "downgrade", "cancel subscription",
        ],
    ),
    (
        Category::FeatureRequest,
        &[
            "enhancement", "feature", "suggestion", "would be nice", "request", "improve",
            "add", "new feature", "functionality", "wish", "idea", "recommend", "could you",
            "it would be great",
        ],
    ),
    (
        Category::BugReport,
        &[
            "defect", "reproduce", "steps to reproduce", "regression", "broken",
            "not as expected", "unexpected behavior", "malfunction", "glitch", "inconsistent",
            "incorrect", "wrong result",
        ],
    ),
];

const PRIORITY_KEYWORDS: &[(Priority, &[&str])] = &[
    (
        Priority::Urgent,
        &[
            "urgent", "critical", "emergency", "production down", "security", "data loss",
            "can't access", "completely broken", "affecting all users", "business critical",
            "asap", "immediately", "right now",
        ],
    ),
    (
        Priority::High,
        &[
            "important", "blocking", "high priority", "serious", "major", "significant impact",
            "need soon", "priority", "affecting many",
        ],
    ),
    (
        Priority::Medium,
        &["moderate", "normal", "standard", "regular", "typical"],
    ),
    (
        Priority::Low,
        &[
            "minor", "low priority", "nice to have", "when possible", "no rush", "whenever",
            "cosmetic", "trivial",
        ],
    ),
];

/// Order in which priority matches override the MEDIUM default.
const PRIORITY_CHAIN: [Priority; 3] = [Priority::Urgent, Priority::High, Priority::Low];

const CATEGORY_WEIGHT: f64 = 0.25;
const PRIORITY_WEIGHT: f64 = 0.3;
const NO_PRIORITY_SIGNAL: f64 = 0.5;
const MAX_REASONING_KEYWORDS: usize = 5;
const MANUAL_OVERRIDE_REASONING: &str = "Manual classification override by user";

fn find_matches(text: &str, keywords: &[&str]) -> Vec<String> {
    keywords
        .iter()
        .filter(|keyword| text.contains(&keyword.to_lowercase()))
        .map(|keyword| keyword.to_string())
        .collect()
}

/// Stateless keyword classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, subject: &str, description: &str) -> ClassificationResult {
        let text = format!("{} {}", subject, description).to_lowercase();

        // Strictly greater keeps the first-declared category on ties.
        let mut category = Category::Other;
        let mut category_matches: Vec<String> = Vec::new();
        for (candidate, keywords) in CATEGORY_KEYWORDS {
            let matches = find_matches(&text, keywords);
            if matches.len() > category_matches.len() {
                category = *candidate;
                category_matches = matches;
            }
        }

        let priority_matches: Vec<(Priority, Vec<String>)> = PRIORITY_KEYWORDS
            .iter()
            .map(|(priority, keywords)| (*priority, find_matches(&text, keywords)))
            .filter(|(_, matches)| !matches.is_empty())
            .collect();

        let matches_for = |priority: Priority| {
            priority_matches
                .iter()
                .find(|(p, _)| *p == priority)
                .map(|(_, matches)| matches.as_slice())
                .unwrap_or(&[])
        };

        let priority = PRIORITY_CHAIN
            .iter()
            .copied()
            .find(|p| !matches_for(*p).is_empty())
            .unwrap_or(Priority::Medium);

        let category_confidence = if category == Category::Other {
            0.0
        } else {
            (category_matches.len() as f64 * CATEGORY_WEIGHT).min(1.0)
        };
        let priority_confidence = if priority_matches.is_empty() {
            NO_PRIORITY_SIGNAL
        } else {
            (matches_for(priority).len() as f64 * PRIORITY_WEIGHT).min(1.0)
        };
        let confidence_score = (category_confidence + priority_confidence) / 2.0;

        let mut matched_keywords = category_matches;
        matched_keywords.extend(matches_for(priority).iter().cloned());

        let reasoning = build_reasoning(category, priority, &matched_keywords, confidence_score);

        tracing::debug!(
            "Classified as {} / {} (confidence {:.2}, keywords {:?})",
            category,
            priority,
            confidence_score,
            matched_keywords
        );

        ClassificationResult {
            category,
            priority,
            confidence_score,
            matched_keywords,
            reasoning,
            classified_at: Utc::now(),
            is_manual_override: false,
        }
    }

    pub fn classify_ticket(&self, ticket: &Ticket) -> ClassificationResult {
        self.classify(&ticket.subject, &ticket.description)
    }

    /// Re-scores the ticket text and replaces classification, category and
    /// priority. A previous manual override is overwritten as well.
    pub fn reclassify_ticket(&self, ticket: &mut Ticket) {
        let classification = self.classify_ticket(ticket);
        ticket.category = classification.category;
        ticket.priority = classification.priority;

        tracing::info!(
            "🔁 Reclassified ticket {} - Category: {}, Priority: {}, Confidence: {:.2}",
            ticket.id,
            classification.category,
            classification.priority,
            classification.confidence_score
        );

        ticket.classification = Some(classification);
    }

    /// Applies a human classification without re-scoring the text.
    pub fn manual_override(
        &self,
        ticket: &mut Ticket,
        mut classification: ClassificationResult,
    ) -> ClassificationResult {
        classification.is_manual_override = true;
        classification.classified_at = Utc::now();
        if classification.reasoning.trim().is_empty() {
            classification.reasoning = MANUAL_OVERRIDE_REASONING.to_string();
        }

        ticket.category = classification.category;
        ticket.priority = classification.priority;
        ticket.classification = Some(classification.clone());

        tracing::info!(
            "✍️ Manual override for ticket {} - Category: {}, Priority: {}",
            ticket.id,
            classification.category,
            classification.priority
        );

        classification
    }
}

fn build_reasoning(
    category: Category,
    priority: Priority,
    matched_keywords: &[String],
    confidence: f64,
) -> String {
    let mut reasoning = if category == Category::Other && matched_keywords.is_empty() {
        "No specific keywords matched. Defaulting to 'Other' category.".to_string()
    } else {
        let shown: Vec<&str> = matched_keywords
            .iter()
            .take(MAX_REASONING_KEYWORDS)
            .map(String::as_str)
            .collect();
        format!(
            "Classified as '{}' based on keywords: {}",
            category.display_name(),
            shown.join(", ")
        )
    };

    reasoning.push_str(&format!(" Priority set to '{}'", priority.display_name()));

    let qualifier = if confidence < 0.5 {
        " (Low confidence - manual review recommended)"
    } else if confidence < 0.7 {
        " (Medium confidence)"
    } else {
        " (High confidence)"
    };
    reasoning.push_str(qualifier);

    reasoning
}
