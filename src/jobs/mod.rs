//! Print job domain - records, statuses and intake normalization

pub mod intake;
pub mod model;

pub use intake::{
    CanvaWebhookEvent, EmailJobRequest, FormJobRequest, Quantity, EXPORT_COMPLETED_EVENT,
};
pub use model::{DesignAttachment, JobQuery, JobSource, JobStatus, NewPrintJob, PrintJob};
