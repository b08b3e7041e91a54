/// Plain records owned by the stores, and the outward views built from them.
/// Password hashes live only on the `*Record` types.

mod admin;
mod history;
mod student;

pub use admin::{AdminProfile, AdminRecord, NewAdmin};
pub use history::{HistoryEntry, HistoryView, StudentSummary};
pub use student::{NewStudent, StudentChanges, StudentProfile, StudentRecord};
