use crate::domain::model::{Category, CreatedTicket, Priority, Status, Ticket, TicketRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn batch_size(&self) -> usize;
    fn max_file_size(&self) -> u64;
}

/// Ticket-creation boundary consumed by the importer.
#[async_trait]
pub trait TicketService: Send + Sync {
    async fn create_ticket(&self, request: TicketRequest) -> Result<CreatedTicket>;
}

/// Filters for `TicketRepository::find_all`. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilter {
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub assigned_to: Option<String>,
    /// Case-insensitive substring of subject or description.
    pub keyword: Option<String>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if self.category.is_some_and(|c| c != ticket.category) {
            return false;
        }
        if self.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }
        if let Some(customer_id) = &self.customer_id {
            if &ticket.customer.customer_id != customer_id {
                return false;
            }
        }
        if let Some(customer_email) = &self.customer_email {
            if &ticket.customer.customer_email != customer_email {
                return false;
            }
        }
        if let Some(assigned_to) = &self.assigned_to {
            if ticket.assigned_to.as_ref() != Some(assigned_to) {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            let keyword = keyword.to_lowercase();
            if !ticket.subject.to_lowercase().contains(&keyword)
                && !ticket.description.to_lowercase().contains(&keyword)
            {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: usize,
    pub size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

/// Persistence boundary for tickets.
pub trait TicketRepository: Send + Sync {
    fn save(&self, ticket: Ticket) -> Result<Ticket>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>>;
    fn exists_by_id(&self, id: Uuid) -> Result<bool>;
    fn delete_by_id(&self, id: Uuid) -> Result<()>;
    fn find_all(&self, filter: &TicketFilter, page: PageRequest) -> Result<Page<Ticket>>;
    fn count_by_status(&self, status: Status) -> Result<usize>;
}
