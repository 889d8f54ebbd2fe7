pub mod document_submitter;
pub mod job_poller;
pub mod result_writer;

pub use document_submitter::DocumentSubmitter;
pub use job_poller::{JobPoller, PollError, PollPolicy};
pub use result_writer::ResultWriter;
