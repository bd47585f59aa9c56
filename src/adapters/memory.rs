use crate::domain::model::{Status, Ticket};
use crate::domain::ports::{Page, PageRequest, TicketFilter, TicketRepository};
use crate::utils::error::{IntakeError, Result};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Process-local ticket store used by the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryTicketRepository {
    tickets: RwLock<HashMap<Uuid, Ticket>>,
}

fn poisoned() -> IntakeError {
    IntakeError::Internal {
        message: "ticket store lock poisoned".to_string(),
    }
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Ticket>>> {
        self.tickets.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Ticket>>> {
        self.tickets.write().map_err(|_| poisoned())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }
}

impl TicketRepository for InMemoryTicketRepository {
    fn save(&self, ticket: Ticket) -> Result<Ticket> {
        self.write()?.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn exists_by_id(&self, id: Uuid) -> Result<bool> {
        Ok(self.read()?.contains_key(&id))
    }

    fn delete_by_id(&self, id: Uuid) -> Result<()> {
        self.write()?.remove(&id);
        Ok(())
    }

    /// Oldest first; ties broken by id so paging is stable.
    fn find_all(&self, filter: &TicketFilter, page: PageRequest) -> Result<Page<Ticket>> {
        let mut matching: Vec<Ticket> = self
            .read()?
            .values()
            .filter(|ticket| filter.matches(ticket))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let size = page.size.max(1);
        let total_elements = matching.len();
        let content = matching
            .into_iter()
            .skip(page.page.saturating_mul(size))
            .take(size)
            .collect();

        Ok(Page {
            content,
            page: page.page,
            size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        })
    }

    fn count_by_status(&self, status: Status) -> Result<usize> {
        Ok(self
            .read()?
            .values()
            .filter(|ticket| ticket.status == status)
            .count())
    }
}
