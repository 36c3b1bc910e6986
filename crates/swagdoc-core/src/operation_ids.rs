use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::document::Document;
use crate::model::path_item::HttpMethod;

const ANONYMOUS_OPERATION_ID: &str = "Anonymous";

#[derive(Debug)]
struct Entry {
    path: String,
    method: HttpMethod,
    id: String,
    returns_array: bool,
}

impl Document {
    /// Gives every inline operation a non-empty, document-unique
    /// `operationId`. Running it again on the result changes nothing.
    pub fn generate_operation_ids(&mut self) {
        generate_operation_ids(self);
    }
}

/// See [`Document::generate_operation_ids`].
pub fn generate_operation_ids(document: &mut Document) {
    let mut round = 1;
    while assign_round(document) {
        round += 1;
        log::debug!("operation id round {round}");
    }
}

/// Seed name for an operation without an ID: the last literal path segment.
pub fn id_from_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.trim().is_empty() && !segment.contains('{'))
        .next_back()
        .unwrap_or(ANONYMOUS_OPERATION_ID)
        .to_string()
}

/// One pass over the document. Returns `true` when IDs changed and the
/// document has to be checked again.
fn assign_round(document: &mut Document) -> bool {
    let mut entries: Vec<Entry> = document
        .operations()
        .map(|op| Entry {
            path: op.path.to_string(),
            method: op.method,
            id: op
                .operation
                .operation_id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| id_from_path(op.path)),
            returns_array: op.operation.returns_array(op.components),
        })
        .collect();

    let groups = duplicate_groups(&entries, 0..entries.len());
    if groups.is_empty() {
        write_back(document, &entries);
        return false;
    }

    for group in groups {
        let arrays: Vec<usize> = group
            .iter()
            .copied()
            .filter(|&i| entries[i].returns_array)
            .collect();
        let mut colliding = group.clone();
        if !arrays.is_empty() && arrays.len() < group.len() {
            for &i in &arrays {
                entries[i].id.push_str("All");
            }
            colliding.retain(|&i| !entries[i].returns_array);
        }
        if colliding.len() < 2 {
            continue;
        }

        let methods: HashSet<HttpMethod> = colliding.iter().map(|&i| entries[i].method).collect();
        if methods.len() > 1 {
            for &i in &colliding {
                let suffix = entries[i].method.as_upper_str();
                entries[i].id.push_str(suffix);
            }
        }

        let remaining = duplicate_groups(&entries, colliding);
        if !remaining.is_empty() {
            for subgroup in remaining {
                for (n, &i) in subgroup.iter().enumerate().skip(1) {
                    entries[i].id.push_str(&(n + 1).to_string());
                }
            }
            // A numbered ID may now clash with one set elsewhere; start over.
            write_back(document, &entries);
            return true;
        }
    }

    write_back(document, &entries);
    true
}

/// Groups of entry indices sharing an ID, in first-occurrence order.
fn duplicate_groups(entries: &[Entry], members: impl IntoIterator<Item = usize>) -> Vec<Vec<usize>> {
    let mut groups: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for i in members {
        groups.entry(entries[i].id.as_str()).or_default().push(i);
    }
    groups.into_values().filter(|g| g.len() > 1).collect()
}

fn write_back(document: &mut Document, entries: &[Entry]) {
    for entry in entries {
        let Some(operation) = document.operation_mut(&entry.path, entry.method) else {
            continue;
        };
        if operation.operation_id.as_deref() != Some(entry.id.as_str()) {
            log::debug!(
                "operation {} {} -> {}",
                entry.method.as_upper_str(),
                entry.path,
                entry.id
            );
            operation.operation_id = Some(entry.id.clone());
        }
    }
}
