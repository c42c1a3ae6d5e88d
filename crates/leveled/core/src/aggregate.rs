//! Final grouping of resolver output.

use std::collections::HashMap;

use crate::ident::FormId;
use crate::resolve::OutputRecord;

/// Total quantity of one terminal object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemCount {
    pub object: FormId,
    pub count: u32,
}

impl ItemCount {
    pub const fn new(object: FormId, count: u32) -> Self {
        Self { object, count }
    }
}

/// Groups records by object and sums their counts.
///
/// Output order is the order in which each object first appears, so the
/// result is fully determined by the input sequence.
pub fn aggregate(records: &[OutputRecord]) -> Vec<ItemCount> {
    let mut totals: Vec<ItemCount> = Vec::new();
    let mut slots: HashMap<FormId, usize> = HashMap::with_capacity(records.len());

    for record in records {
        match slots.get(&record.object) {
            Some(&slot) => {
                totals[slot].count = totals[slot].count.saturating_add(record.count);
            }
            None => {
                slots.insert(record.object, totals.len());
                totals.push(ItemCount::new(record.object, record.count));
            }
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(object: u32, count: u32) -> OutputRecord {
        OutputRecord {
            object: FormId(object),
            count,
            value_multiplier: None,
            template: None,
        }
    }

    #[test]
    fn sums_duplicates_in_first_seen_order() {
        let records = [record(7, 2), record(3, 1), record(7, 5), record(9, 1), record(3, 4)];
        assert_eq!(
            aggregate(&records),
            vec![
                ItemCount::new(FormId(7), 7),
                ItemCount::new(FormId(3), 5),
                ItemCount::new(FormId(9), 1),
            ]
        );
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn counts_saturate() {
        let records = [record(1, u32::MAX), record(1, 10)];
        assert_eq!(aggregate(&records), vec![ItemCount::new(FormId(1), u32::MAX)]);
    }
}
