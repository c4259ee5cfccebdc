use std::cmp::Ordering;

use super::domain::ObjectEntry;

/// Order of the Object screen. Directories always come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCriteria {
    #[default]
    NameAsc,
    NameDesc,
    SizeAsc,
    SizeDesc,
    ModifiedAsc,
    ModifiedDesc,
}

impl SortCriteria {
    pub fn next(self) -> Self {
        match self {
            SortCriteria::NameAsc => SortCriteria::NameDesc,
            SortCriteria::NameDesc => SortCriteria::SizeAsc,
            SortCriteria::SizeAsc => SortCriteria::SizeDesc,
            SortCriteria::SizeDesc => SortCriteria::ModifiedAsc,
            SortCriteria::ModifiedAsc => SortCriteria::ModifiedDesc,
            SortCriteria::ModifiedDesc => SortCriteria::NameAsc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortCriteria::NameAsc => "Name A→Z",
            SortCriteria::NameDesc => "Name Z→A",
            SortCriteria::SizeAsc => "Size ↑",
            SortCriteria::SizeDesc => "Size ↓",
            SortCriteria::ModifiedAsc => "Date ↑",
            SortCriteria::ModifiedDesc => "Date ↓",
        }
    }

    /// A missing modification time sorts as the oldest.
    pub fn compare(self, a: &ObjectEntry, b: &ObjectEntry) -> Ordering {
        b.is_directory.cmp(&a.is_directory).then_with(|| match self {
            SortCriteria::NameAsc => compare_names(a, b),
            SortCriteria::NameDesc => compare_names(b, a),
            SortCriteria::SizeAsc => a.size.cmp(&b.size),
            SortCriteria::SizeDesc => b.size.cmp(&a.size),
            SortCriteria::ModifiedAsc => a.last_modified.cmp(&b.last_modified),
            SortCriteria::ModifiedDesc => b.last_modified.cmp(&a.last_modified),
        })
    }
}

fn compare_names(a: &ObjectEntry, b: &ObjectEntry) -> Ordering {
    a.key
        .to_lowercase()
        .cmp(&b.key.to_lowercase())
        .then_with(|| a.key.cmp(&b.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sorted(criteria: SortCriteria, entries: &[ObjectEntry]) -> Vec<String> {
        let mut entries = entries.to_vec();
        entries.sort_by(|a, b| criteria.compare(a, b));
        entries.into_iter().map(|e| e.key).collect()
    }

    fn entries() -> Vec<ObjectEntry> {
        let mut old = ObjectEntry::file("b.txt", 300);
        old.last_modified = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single();
        let mut new = ObjectEntry::file("C.txt", 10);
        new.last_modified = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single();
        vec![
            old,
            ObjectEntry::directory("z/"),
            new,
            ObjectEntry::file("a.txt", 20),
            ObjectEntry::directory("B/"),
        ]
    }

    #[test]
    fn test_cycle_visits_every_order() {
        let mut criteria = SortCriteria::default();
        let mut seen = vec![criteria];
        for _ in 0..5 {
            criteria = criteria.next();
            assert!(!seen.contains(&criteria));
            seen.push(criteria);
        }
        assert_eq!(criteria.next(), SortCriteria::NameAsc);
    }

    #[test]
    fn test_name_is_case_insensitive_with_directories_first() {
        assert_eq!(
            sorted(SortCriteria::NameAsc, &entries()),
            vec!["B/", "z/", "a.txt", "b.txt", "C.txt"]
        );
        assert_eq!(
            sorted(SortCriteria::NameDesc, &entries()),
            vec!["z/", "B/", "C.txt", "b.txt", "a.txt"]
        );
    }

    #[test]
    fn test_size_and_date() {
        assert_eq!(
            sorted(SortCriteria::SizeDesc, &entries())[2..],
            ["b.txt", "a.txt", "C.txt"]
        );
        assert_eq!(
            sorted(SortCriteria::ModifiedAsc, &entries())[2..],
            ["a.txt", "b.txt", "C.txt"]
        );
        assert_eq!(
            sorted(SortCriteria::ModifiedDesc, &entries())[2..],
            ["C.txt", "b.txt", "a.txt"]
        );
    }
}
