pub mod checklist;
pub mod incidences;
pub mod master_data;
pub mod report;
pub mod session;
