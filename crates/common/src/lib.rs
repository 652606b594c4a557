//! Shared building blocks for the comments API crates: logging setup,
//! startup environment checks and the small wire types used by more than
//! one crate.

pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_payload_reports_ok() {
        let s = types::ServiceStatus::up("ready");
        assert_eq!(s.status, 200);
        assert_eq!(s.message, "ready");
    }
}
