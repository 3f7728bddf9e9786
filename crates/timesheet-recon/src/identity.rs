//! Bridging primary staff ids to secondary-system email addresses.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::Diagnostic;
use crate::record::IdentityMapping;

/// What a staff id resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity<'a> {
    pub email: Option<&'a str>,
    pub owner: Option<&'a str>,
}

/// Deduplicated staff id lookup.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    by_staff_id: HashMap<String, IdentityMapping>,
}

impl IdentityResolver {
    /// Merge the mapping segments in order. The first row for a staff id wins,
    /// so earlier segments take precedence over later ones.
    pub fn new<'a>(
        segments: impl IntoIterator<Item = (&'a str, Vec<IdentityMapping>)>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut by_staff_id = HashMap::new();
        for (segment, mappings) in segments {
            for mapping in mappings {
                match by_staff_id.entry(mapping.staff_id.clone()) {
                    Entry::Vacant(vacant) => {
                        vacant.insert(mapping);
                    }
                    Entry::Occupied(_) => {
                        diagnostics.push(Diagnostic::DuplicateStaffId {
                            staff_id: mapping.staff_id,
                            segment: segment.to_owned(),
                        });
                    }
                }
            }
        }
        tracing::debug!("{} unique staff ids in mapping", by_staff_id.len());

        IdentityResolver { by_staff_id }
    }

    pub fn len(&self) -> usize {
        self.by_staff_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_staff_id.is_empty()
    }

    pub fn resolve(&self, staff_id: &str) -> Option<Identity<'_>> {
        self.by_staff_id.get(staff_id).map(|mapping| Identity {
            email: mapping.email.as_deref(),
            owner: mapping.owner.as_deref(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(staff_id: &str, email: &str) -> IdentityMapping {
        IdentityMapping {
            staff_id: staff_id.to_owned(),
            email: Some(email.to_owned()),
            owner: Some("Retail".to_owned()),
        }
    }

    #[test]
    fn active_segment_wins() {
        let mut diagnostics = Vec::new();
        let resolver = IdentityResolver::new(
            [
                ("Offshore Active", vec![mapping("100", "jane@x.com")]),
                ("Offshore Inactive", vec![mapping("100", "old.jane@x.com")]),
            ],
            &mut diagnostics,
        );

        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.resolve("100").unwrap().email, Some("jane@x.com"));
        assert_eq!(
            diagnostics,
            [Diagnostic::DuplicateStaffId {
                staff_id: "100".to_owned(),
                segment: "Offshore Inactive".to_owned(),
            }]
        );
    }

    #[test]
    fn first_row_within_a_segment_wins() {
        let mut diagnostics = Vec::new();
        let resolver = IdentityResolver::new(
            [(
                "Offshore Active",
                vec![mapping("7", "first@x.com"), mapping("7", "second@x.com")],
            )],
            &mut diagnostics,
        );

        assert_eq!(resolver.resolve("7").unwrap().email, Some("first@x.com"));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn unknown_staff_id_is_absent() {
        let no_segments: Vec<(&str, Vec<IdentityMapping>)> = Vec::new();
        let resolver = IdentityResolver::new(no_segments, &mut Vec::new());
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve("100"), None);
    }
}
