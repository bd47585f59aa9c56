pub mod aggregator;
pub mod classifier;
pub mod importer;
pub mod ticket_service;
pub mod validator;

pub use crate::domain::ports::{ConfigProvider, Storage, TicketRepository, TicketService};
pub use crate::utils::error::Result;
pub use aggregator::ResultAggregator;
pub use classifier::Classifier;
pub use importer::{ImportEngine, ImportRequest};
pub use ticket_service::{TicketManager, TicketQuery};
