use std::collections::HashSet;

use super::types::Message;

/// The list never grows past this many messages.
pub const MAX_MESSAGES: usize = 100;

/// Only the first few entries keep their new-message highlight.
pub const MAX_NEW_FLAGGED: usize = 3;

#[derive(Debug, Default, PartialEq)]
pub struct MergeOutcome {
    /// How many incoming messages were not already in the list.
    pub fresh: usize,
}

/// Merge an incoming batch into the current list.
///
/// Incoming messages whose id is already present are dropped. If nothing
/// survives the filter the list is left untouched. Otherwise the unique new
/// messages are prepended flagged `is_new`, the list is capped at
/// [`MAX_MESSAGES`], and `is_new` is cleared on everything past index
/// [`MAX_NEW_FLAGGED`] - 1.
pub fn merge_new(current: &mut Vec<Message>, incoming: Vec<Message>) -> MergeOutcome {
    let mut seen: HashSet<String> = current.iter().map(|m| m.id.clone()).collect();
    let fresh: Vec<Message> = incoming
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect();

    if fresh.is_empty() {
        return MergeOutcome { fresh: 0 };
    }

    let fresh_count = fresh.len();
    let mut merged = Vec::with_capacity(fresh_count + current.len());
    for mut message in fresh {
        message.is_new = true;
        merged.push(message);
    }
    merged.append(current);
    merged.truncate(MAX_MESSAGES);
    for message in merged.iter_mut().skip(MAX_NEW_FLAGGED) {
        message.is_new = false;
    }

    *current = merged;
    MergeOutcome { fresh: fresh_count }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str) -> Message {
        Message {
            id: id.to_string(),
            from: format!("{id}@example.org"),
            subject: format!("subject {id}"),
            body: String::new(),
            received: 1_700_000_000,
            is_new: false,
        }
    }

    #[test]
    fn prepends_unique_new_messages() {
        let mut list = vec![msg("1")];
        let outcome = merge_new(&mut list, vec![msg("1"), msg("2")]);
        assert_eq!(outcome.fresh, 1);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "2");
        assert!(list[0].is_new);
        assert_eq!(list[1].id, "1");
    }

    #[test]
    fn empty_or_duplicate_batch_leaves_list_untouched() {
        let mut list = vec![msg("1"), msg("2")];
        assert_eq!(merge_new(&mut list, vec![]).fresh, 0);
        assert_eq!(merge_new(&mut list, vec![msg("1"), msg("2")]).fresh, 0);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "1");
    }

    #[test]
    fn no_duplicate_ids_even_within_one_batch() {
        let mut list = vec![msg("1")];
        let outcome = merge_new(&mut list, vec![msg("2"), msg("2"), msg("3")]);
        assert_eq!(outcome.fresh, 2);
        let mut ids: Vec<&str> = list.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), list.len());
    }

    #[test]
    fn list_is_capped() {
        let mut list = Vec::new();
        let batch: Vec<Message> = (0..150).map(|i| msg(&i.to_string())).collect();
        let outcome = merge_new(&mut list, batch);
        assert_eq!(outcome.fresh, 150);
        assert_eq!(list.len(), MAX_MESSAGES);
        // newest-first: the batch order is preserved on prepend
        assert_eq!(list[0].id, "0");
    }

    #[test]
    fn at_most_three_flagged_new_after_any_merge() {
        let mut list = Vec::new();
        merge_new(&mut list, (0..10).map(|i| msg(&i.to_string())).collect());
        assert_eq!(list.iter().filter(|m| m.is_new).count(), 3);

        // a later merge pushes older highlights past the cutoff
        merge_new(&mut list, vec![msg("x")]);
        assert_eq!(list.iter().filter(|m| m.is_new).count(), 3);
        assert!(list[0].is_new);
        assert_eq!(list[0].id, "x");
        assert!(!list[3].is_new);
    }
}
