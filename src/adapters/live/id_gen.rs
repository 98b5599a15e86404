//! Random case ids.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Stamps cases with random v4 uuids.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveIdGenerator;

impl LiveIdGenerator {
    /// Creates the generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for LiveIdGenerator {
    fn case_id(&self) -> String {
        Uuid::new_v4().hyphenated().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_ids_are_distinct_v4_uuids() {
        let ids = LiveIdGenerator::new();
        let first = Uuid::parse_str(&ids.case_id()).unwrap();
        let second = Uuid::parse_str(&ids.case_id()).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.get_version_num(), 4);
    }
}
