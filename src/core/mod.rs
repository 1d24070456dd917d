pub mod dispatcher;
pub mod drafts;
pub mod handler;
pub mod html;
pub mod report;

pub use crate::domain::model::{DispatchReport, Recipient, SendRecord};
pub use crate::domain::ports::{ContactBatchOutcome, EmailProvider, Storage};
pub use crate::utils::error::Result;
