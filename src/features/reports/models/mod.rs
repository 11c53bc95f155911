mod report;
mod report_verification;

pub use report::{
    CreateReport, HazardType, Report, ReportSeverity, ReportSource, ReportStatus, StatusChange,
    UnknownVariant,
};
pub use report_verification::ReportVerification;
