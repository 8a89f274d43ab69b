pub mod identity;
pub mod report;
pub mod result_record;

pub use identity::Identity;
pub use report::{FailedTask, ReportEntry, RunReport, TaskOutcome};
pub use result_record::{CertResult, CertificateGrade, ResultRecord, ResultsQuery};
