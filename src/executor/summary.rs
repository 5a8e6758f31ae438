use std::collections::BTreeMap;

/// Outcome counters for a run, plus the error text recorded per failed
/// stack. Summaries merge additively.
#[derive(Debug, Default, Clone)]
pub struct Summary {
    pub executed: usize,
    pub cached: usize,
    pub skipped: usize,
    pub failed: BTreeMap<String, String>,
}

impl Summary {
    pub fn merge(&mut self, other: Summary) {
        self.executed += other.executed;
        self.cached += other.cached;
        self.skipped += other.skipped;
        self.failed.extend(other.failed);
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_additive() {
        let mut total = Summary {
            executed: 1,
            cached: 2,
            skipped: 0,
            failed: BTreeMap::new(),
        };

        let mut other = Summary::default();
        other.executed = 2;
        other.failed.insert("app".to_string(), "boom".to_string());

        total.merge(other);
        assert_eq!(total.executed, 3);
        assert_eq!(total.cached, 2);
        assert!(!total.is_success());
        assert_eq!(total.failed.get("app").map(String::as_str), Some("boom"));
    }
}
