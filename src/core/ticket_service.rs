use crate::core::classifier::Classifier;
use crate::core::validator::validate_ticket_data;
use crate::domain::model::{
    Category, ClassificationResult, CreatedTicket, Priority, Status, Ticket, TicketRequest,
    UpdateTicketRequest,
};
use crate::domain::ports::{Page, PageRequest, TicketFilter, TicketRepository, TicketService};
use crate::utils::error::{IntakeError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// String-valued listing query as it arrives from a caller. Enum fields that
/// do not parse are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub assigned_to: Option<String>,
    pub keyword: Option<String>,
}

fn lenient_enum<T: FromStr>(field: &str, value: Option<&str>) -> Option<T> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("⚠️ Ignoring invalid {} filter: {}", field, value);
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TicketQuery {
    pub fn into_filter(self) -> TicketFilter {
        TicketFilter {
            status: lenient_enum::<Status>("status", self.status.as_deref()),
            category: lenient_enum::<Category>("category", self.category.as_deref()),
            priority: lenient_enum::<Priority>("priority", self.priority.as_deref()),
            customer_id: non_blank(self.customer_id),
            customer_email: non_blank(self.customer_email),
            assigned_to: non_blank(self.assigned_to),
            keyword: non_blank(self.keyword),
        }
    }
}

/// Ticket lifecycle on top of a repository: validation, automatic
/// classification, updates and listing.
pub struct TicketManager<R: TicketRepository> {
    repository: R,
    classifier: Classifier,
}

impl<R: TicketRepository> TicketManager<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            classifier: Classifier::new(),
        }
    }

    fn require(&self, id: Uuid) -> Result<Ticket> {
        self.repository
            .find_by_id(id)?
            .ok_or_else(|| IntakeError::NotFound {
                resource: "Ticket".to_string(),
                id: id.to_string(),
            })
    }

    /// Validates, applies defaults, auto-classifies and stores a new ticket.
    /// Category and priority supplied by the caller win over the classifier.
    pub fn create(&self, request: TicketRequest) -> Result<Ticket> {
        validate_ticket_data(&request)?;

        let explicit_category = request.category;
        let explicit_priority = request.priority;
        let mut ticket = Ticket::from_request(request);

        let classification = self.classifier.classify_ticket(&ticket);
        ticket.category = explicit_category.unwrap_or(classification.category);
        ticket.priority = explicit_priority.unwrap_or(classification.priority);
        ticket.classification = Some(classification);

        let saved = self.repository.save(ticket)?;
        tracing::info!(
            "🎫 Created ticket {} for customer {} ({} / {})",
            saved.id,
            saved.customer.customer_id,
            saved.category,
            saved.priority
        );
        Ok(saved)
    }

    pub fn get_ticket(&self, id: Uuid) -> Result<Ticket> {
        self.require(id)
    }

    pub fn delete_ticket(&self, id: Uuid) -> Result<()> {
        if !self.repository.exists_by_id(id)? {
            return Err(IntakeError::NotFound {
                resource: "Ticket".to_string(),
                id: id.to_string(),
            });
        }
        self.repository.delete_by_id(id)?;
        tracing::info!("🗑️ Deleted ticket {}", id);
        Ok(())
    }

    pub fn update_ticket(&self, id: Uuid, update: UpdateTicketRequest) -> Result<Ticket> {
        let mut ticket = self.require(id)?;
        let mut text_changed = false;

        if let Some(subject) = update.subject {
            text_changed |= subject != ticket.subject;
            ticket.subject = subject;
        }
        if let Some(description) = update.description {
            text_changed |= description != ticket.description;
            ticket.description = description;
        }
        if let Some(category) = update.category {
            ticket.category = category;
        }
        if let Some(priority) = update.priority {
            ticket.priority = priority;
        }
        if let Some(status) = update.status {
            ticket.status = status;
            if matches!(status, Status::Resolved | Status::Closed) && ticket.resolved_at.is_none() {
                ticket.resolved_at = Some(Utc::now());
            }
        }
        if let Some(assigned_to) = update.assigned_to {
            ticket.assigned_to = Some(assigned_to);
        }
        if let Some(tags) = update.tags {
            ticket.tags = tags;
        }

        if text_changed {
            let classification = self.classifier.classify_ticket(&ticket);
            if !ticket.is_manually_classified() {
                ticket.category = classification.category;
                ticket.priority = classification.priority;
                ticket.classification = Some(classification);
            } else {
                tracing::debug!("Ticket {} keeps its manual classification", ticket.id);
            }
        }

        ticket.updated_at = Utc::now();
        let saved = self.repository.save(ticket)?;
        tracing::info!("✏️ Updated ticket {}", saved.id);
        Ok(saved)
    }

    pub fn auto_classify_ticket(&self, id: Uuid) -> Result<ClassificationResult> {
        let mut ticket = self.require(id)?;
        self.classifier.reclassify_ticket(&mut ticket);
        ticket.updated_at = Utc::now();
        let saved = self.repository.save(ticket)?;
        saved.classification.ok_or_else(|| IntakeError::Internal {
            message: format!("classification missing after reclassifying {}", id),
        })
    }

    pub fn override_classification(
        &self,
        id: Uuid,
        classification: ClassificationResult,
    ) -> Result<ClassificationResult> {
        let mut ticket = self.require(id)?;
        let applied = self.classifier.manual_override(&mut ticket, classification);
        ticket.updated_at = Utc::now();
        self.repository.save(ticket)?;
        Ok(applied)
    }

    pub fn list_tickets(&self, query: TicketQuery, page: PageRequest) -> Result<Page<Ticket>> {
        let filter = query.into_filter();
        tracing::debug!("Listing tickets with {:?} {:?}", filter, page);
        self.repository.find_all(&filter, page)
    }

    pub fn count_by_status(&self, status: &str) -> Result<usize> {
        let status = status
            .parse::<Status>()
            .map_err(|reason| IntakeError::validation("status", reason))?;
        self.repository.count_by_status(status)
    }
}

#[async_trait]
impl<R: TicketRepository> TicketService for TicketManager<R> {
    async fn create_ticket(&self, request: TicketRequest) -> Result<CreatedTicket> {
        let ticket = self.create(request)?;
        Ok(CreatedTicket::from(&ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryTicketRepository;

    fn manager() -> TicketManager<InMemoryTicketRepository> {
        TicketManager::new(InMemoryTicketRepository::new())
    }

    fn request(subject: &str, description: &str) -> TicketRequest {
        TicketRequest {
            customer_id: "CUST-9".to_string(),
            customer_email: "nine@example.com".to_string(),
            customer_name: "Nine".to_string(),
            subject: subject.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_ticket_classifies_and_stores() {
        let manager = manager();
        let created = manager
            .create_ticket(request(
                "Cannot login",
                "Password reset link never arrives, urgent please",
            ))
            .await
            .unwrap();

        let ticket = manager.get_ticket(created.ticket_id).unwrap();
        assert_eq!(ticket.status, Status::New);
        assert_eq!(ticket.category, Category::AccountAccess);
        assert_eq!(ticket.priority, Priority::Urgent);
        assert!(ticket.classification.is_some());
        assert!(!ticket.is_manually_classified());
    }

    #[tokio::test]
    async fn test_create_ticket_rejects_invalid_data() {
        let manager = manager();
        let err = manager
            .create_ticket(request("Hi", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Validation { .. }));
        assert_eq!(manager.count_by_status("NEW").unwrap(), 0);
    }

    #[test]
    fn test_explicit_category_wins_over_classifier() {
        let mut req = request("Invoice question", "Where is my invoice for last month?");
        req.category = Some(Category::Other);
        let ticket = manager().create(req).unwrap();
        assert_eq!(ticket.category, Category::Other);
        assert_eq!(
            ticket.classification.unwrap().category,
            Category::BillingQuestion
        );
    }

    #[test]
    fn test_missing_ticket_is_not_found() {
        let manager = manager();
        let id = Uuid::new_v4();
        assert!(matches!(manager.get_ticket(id), Err(IntakeError::NotFound { .. })));
        assert!(matches!(manager.delete_ticket(id), Err(IntakeError::NotFound { .. })));
        assert!(matches!(
            manager.update_ticket(id, UpdateTicketRequest::default()),
            Err(IntakeError::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolved_at_is_stamped_once() {
        let manager = manager();
        let ticket = manager
            .create(request("Question", "A general question about my account"))
            .unwrap();

        let resolved = manager
            .update_ticket(
                ticket.id,
                UpdateTicketRequest {
                    status: Some(Status::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();
        let first = resolved.resolved_at.unwrap();

        let closed = manager
            .update_ticket(
                ticket.id,
                UpdateTicketRequest {
                    status: Some(Status::Closed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(closed.resolved_at, Some(first));
        assert_eq!(closed.status, Status::Closed);
    }

    #[test]
    fn test_text_update_reclassifies_unless_overridden() {
        let manager = manager();
        let ticket = manager
            .create(request("Question", "A general question about things"))
            .unwrap();

        let updated = manager
            .update_ticket(
                ticket.id,
                UpdateTicketRequest {
                    description: Some("I need a refund for the duplicate charge".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.category, Category::BillingQuestion);

        manager
            .override_classification(
                ticket.id,
                ClassificationResult::manual(Category::FeatureRequest, Priority::Low),
            )
            .unwrap();

        let updated = manager
            .update_ticket(
                ticket.id,
                UpdateTicketRequest {
                    subject: Some("Login error".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.is_manually_classified());
        assert_eq!(updated.category, Category::FeatureRequest);
        assert_eq!(updated.priority, Priority::Low);
    }

    #[test]
    fn test_auto_classify_replaces_override() {
        let manager = manager();
        let ticket = manager
            .create(request("Crash on start", "The app shows an error and crashes"))
            .unwrap();

        let manual = manager
            .override_classification(
                ticket.id,
                ClassificationResult::manual(Category::Other, Priority::Low),
            )
            .unwrap();
        assert!(manual.is_manual_override);
        assert_eq!(manual.reasoning, "Manual classification override by user");

        let automatic = manager.auto_classify_ticket(ticket.id).unwrap();
        assert!(!automatic.is_manual_override);
        let stored = manager.get_ticket(ticket.id).unwrap();
        assert_eq!(stored.category, Category::TechnicalIssue);
        assert_eq!(stored.classification, Some(automatic));
    }

    #[test]
    fn test_list_ignores_invalid_enum_filters() {
        let manager = manager();
        manager
            .create(request("Refund", "I need a refund for my invoice"))
            .unwrap();
        manager
            .create(request("Login", "Cannot login with my password"))
            .unwrap();

        let page = manager
            .list_tickets(
                TicketQuery {
                    status: Some("bogus".to_string()),
                    keyword: Some("REFUND".to_string()),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].subject, "Refund");

        let page = manager
            .list_tickets(
                TicketQuery {
                    category: Some("account access".to_string()),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].subject, "Login");
    }

    #[test]
    fn test_count_by_status_validates_input() {
        let manager = manager();
        manager
            .create(request("Question", "A general question about things"))
            .unwrap();
        assert_eq!(manager.count_by_status("new").unwrap(), 1);
        assert_eq!(manager.count_by_status("CLOSED").unwrap(), 0);
        assert!(matches!(
            manager.count_by_status("archived"),
            Err(IntakeError::Validation { .. })
        ));
    }

    #[test]
    fn test_delete_ticket() {
        let manager = manager();
        let ticket = manager
            .create(request("Question", "A general question about things"))
            .unwrap();
        manager.delete_ticket(ticket.id).unwrap();
        assert!(matches!(
            manager.get_ticket(ticket.id),
            Err(IntakeError::NotFound { .. })
        ));
    }
}
