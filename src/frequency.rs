use std::collections::HashMap;

use crate::{data::Value, frame::ColumnData};

/// Counts present values in a column, most frequent first.
///
/// Values that tie on count keep the order in which they first appear.
pub fn value_counts(column: &ColumnData) -> Vec<(Value, usize)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(Value, usize)> = Vec::new();
    for row in 0..column.len() {
        let Some(value) = column.get(row) else {
            continue;
        };
        let key = value.as_display();
        match positions.get(&key) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(key, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn top_value(column: &ColumnData) -> Option<(Value, usize)> {
    value_counts(column).into_iter().next()
}

/// Most frequent present string; ties resolve to the lexically smallest value.
pub fn text_mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_counts_orders_by_frequency_then_first_seen() {
        let column = ColumnData::Number(vec![Some(1.0), Some(3.0), None, Some(3.0), Some(4.0)]);
        let counts = value_counts(&column);
        assert_eq!(
            counts,
            vec![
                (Value::Number(3.0), 2),
                (Value::Number(1.0), 1),
                (Value::Number(4.0), 1)
            ]
        );
    }

    #[test]
    fn text_mode_breaks_ties_lexically() {
        let values = vec![
            Some("Queens".to_string()),
            Some("Bronx".to_string()),
            None,
            Some("Queens".to_string()),
            Some("Bronx".to_string()),
        ];
        assert_eq!(text_mode(&values).as_deref(), Some("Bronx"));
        assert_eq!(text_mode(&[None, None]), None);
    }
}
