use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{CommentGroup, Sentiment};

// Placeholder answers students type instead of leaving the box empty.
static EMPTY_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(nan|nil|none|nothing|nill|n/a|n/c|noting else|nun)$").unwrap()
});

// Hyphens, ordinal markers ("1. "), and stray punctuation runs.
static STRIP_MARKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-|\d\.\s|[.?_!*]+").unwrap());

/// Normalizes one free-text comment. Returns `None` for comments that carry
/// no content once cleaned: blanks, bare numbers, and the usual placeholder
/// words.
pub fn clean_comment(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_digits(trimmed) {
        return None;
    }

    let stripped = STRIP_MARKS.replace_all(trimmed, "");
    let text = stripped.trim();
    if text.is_empty() || is_digits(text) || EMPTY_MARKERS.is_match(text) {
        return None;
    }

    Some(text.to_string())
}

fn is_digits(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit())
}

pub fn categorize(polarity: f64) -> Sentiment {
    if polarity > 0.1 {
        Sentiment::Positive
    } else if polarity < -0.1 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Cleans, groups, and orders raw comments. Grouping is case-insensitive and
/// the group keeps the first-encountered casing as its display text. When a
/// polarity function is supplied (an external sentiment capability scoring a
/// string into [-1.0, 1.0]), each group carries the mean polarity of its
/// members and the derived category. Output is ordered by descending count,
/// ties broken by case-insensitive text.
pub fn aggregate_comments(
    raw_comments: &[String],
    polarity: Option<&dyn Fn(&str) -> f64>,
) -> Vec<CommentGroup> {
    struct Group {
        text: String,
        count: usize,
        polarity_sum: f64,
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for raw in raw_comments {
        let Some(cleaned) = clean_comment(raw) else {
            continue;
        };
        let score = polarity.map(|scorer| scorer(&cleaned)).unwrap_or(0.0);
        match by_key.entry(cleaned.to_lowercase()) {
            Entry::Occupied(slot) => {
                let group = &mut groups[*slot.get()];
                group.count += 1;
                group.polarity_sum += score;
            }
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(Group {
                    text: cleaned,
                    count: 1,
                    polarity_sum: score,
                });
            }
        }
    }

    let mut aggregated: Vec<CommentGroup> = groups
        .into_iter()
        .map(|group| {
            let mean = polarity.map(|_| group.polarity_sum / group.count as f64);
            CommentGroup {
                text: group.text,
                count: group.count,
                polarity: mean,
                sentiment: mean.map(categorize),
            }
        })
        .collect();

    aggregated.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.text.to_lowercase().cmp(&b.text.to_lowercase()))
    });

    aggregated
}

/// Section-level sentiment: mean of the group polarities, when present.
pub fn overall_polarity(groups: &[CommentGroup]) -> Option<f64> {
    let polarities: Vec<f64> = groups.iter().filter_map(|group| group.polarity).collect();
    if polarities.is_empty() {
        return None;
    }
    Some(polarities.iter().sum::<f64>() / polarities.len() as f64)
}
