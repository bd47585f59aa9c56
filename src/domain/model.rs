use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Upper-cases an enum name and folds spaces and hyphens into underscores,
/// so "Technical Issue", "technical-issue" and "TECHNICAL_ISSUE" all match.
pub fn normalize_enum_name(value: &str) -> String {
    value
        .trim()
        .to_uppercase()
        .replace([' ', '-'], "_")
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($wire:literal, $display:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn display_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $display),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match normalize_enum_name(s).as_str() {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {} value: {}", stringify!($name).to_lowercase(), s)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_enum! {
    /// Ticket category. Declaration order is the classifier's tie-break order.
    Category {
        AccountAccess => ("ACCOUNT_ACCESS", "Account Access"),
        TechnicalIssue => ("TECHNICAL_ISSUE", "Technical Issue"),
        BillingQuestion => ("BILLING_QUESTION", "Billing Question"),
        FeatureRequest => ("FEATURE_REQUEST", "Feature Request"),
        BugReport => ("BUG_REPORT", "Bug Report"),
        Other => ("OTHER", "Other"),
    }
}

closed_enum! {
    Priority {
        Urgent => ("URGENT", "Urgent"),
        High => ("HIGH", "High"),
        Medium => ("MEDIUM", "Medium"),
        Low => ("LOW", "Low"),
    }
}

closed_enum! {
    Status {
        New => ("NEW", "New"),
        InProgress => ("IN_PROGRESS", "In Progress"),
        WaitingCustomer => ("WAITING_CUSTOMER", "Waiting for Customer"),
        Resolved => ("RESOLVED", "Resolved"),
        Closed => ("CLOSED", "Closed"),
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::New
    }
}

/// Format-independent ticket-creation request produced by every parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub customer_id: String,
    pub customer_email: String,
    pub customer_name: String,
    pub subject: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub assigned_to: Option<String>,
    pub source: Option<String>,
    pub browser: Option<String>,
    pub device_type: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Set by the importer; never read from the file.
    #[serde(skip_deserializing)]
    pub import_batch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub category: Category,
    pub priority: Priority,
    pub confidence_score: f64,
    pub matched_keywords: Vec<String>,
    pub reasoning: String,
    pub classified_at: DateTime<Utc>,
    pub is_manual_override: bool,
}

impl ClassificationResult {
    /// A human-supplied classification; `manual_override` fills in the rest.
    pub fn manual(category: Category, priority: Priority) -> Self {
        Self {
            category,
            priority,
            confidence_score: 1.0,
            matched_keywords: Vec::new(),
            reasoning: String::new(),
            classified_at: Utc::now(),
            is_manual_override: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: String,
    pub customer_email: String,
    pub customer_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMetadata {
    pub source: Option<String>,
    pub browser: Option<String>,
    pub device_type: Option<String>,
    pub import_batch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub customer: Customer,
    pub subject: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub tags: BTreeSet<String>,
    pub metadata: TicketMetadata,
    pub classification: Option<ClassificationResult>,
}

impl Ticket {
    /// Builds a fresh ticket from a request, applying the NEW / OTHER / MEDIUM defaults.
    pub fn from_request(request: TicketRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer: Customer {
                customer_id: request.customer_id.trim().to_string(),
                customer_email: request.customer_email.trim().to_string(),
                customer_name: request.customer_name.trim().to_string(),
            },
            subject: request.subject,
            description: request.description,
            category: request.category.unwrap_or_default(),
            priority: request.priority.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            resolved_at: None,
            assigned_to: request.assigned_to,
            tags: request.tags,
            metadata: TicketMetadata {
                source: request.source,
                browser: request.browser,
                device_type: request.device_type,
                import_batch: request.import_batch,
            },
            classification: None,
        }
    }

    pub fn is_manually_classified(&self) -> bool {
        self.classification
            .as_ref()
            .map(|c| c.is_manual_override)
            .unwrap_or(false)
    }
}

/// What the ticket-creation boundary hands back to the importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTicket {
    pub ticket_id: Uuid,
    pub subject: String,
    pub customer_id: String,
}

impl From<&Ticket> for CreatedTicket {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.id,
            subject: ticket.subject.clone(),
            customer_id: ticket.customer.customer_id.clone(),
        }
    }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub assigned_to: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}
