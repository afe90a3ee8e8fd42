use std::collections::HashMap;

use crate::models::career::{normalize_title, CareerPath};

/// Seniority qualifiers that make otherwise identical titles distinct.
const QUALIFIERS: &[(&str, &str)] = &[
    ("junior", "junior"),
    ("jr", "junior"),
    ("senior", "senior"),
    ("sr", "senior"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    qualifier: Option<&'static str>,
    base: String,
}

fn group_key(title: &str) -> GroupKey {
    let normalized = normalize_title(title);
    let mut qualifier = None;
    let base = normalized
        .split(' ')
        .filter(|word| {
            let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
            match QUALIFIERS.iter().find(|(alias, _)| *alias == bare) {
                Some((_, canonical)) => {
                    qualifier = Some(*canonical);
                    false
                }
                None => true,
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    GroupKey { qualifier, base }
}

/// Collapses recommendations that share a normalized title.
///
/// Junior/senior variants stay separate. Within a group the highest
/// `match_score` survives (the earliest on ties), groups keep the order in
/// which they first appeared, blank titles are dropped, and survivors are
/// renumbered from 1.
pub fn dedupe_career_paths(paths: Vec<CareerPath>) -> Vec<CareerPath> {
    let mut survivors: Vec<CareerPath> = Vec::with_capacity(paths.len());
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for path in paths {
        if path.title.trim().is_empty() {
            continue;
        }
        let key = group_key(&path.title);
        match index.get(&key) {
            Some(&i) => {
                if path.match_score > survivors[i].match_score {
                    survivors[i] = path;
                }
            }
            None => {
                index.insert(key, survivors.len());
                survivors.push(path);
            }
        }
    }

    for (i, path) in survivors.iter_mut().enumerate() {
        path.id = (i + 1) as u32;
    }
    survivors
}
