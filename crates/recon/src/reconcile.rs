use crate::cache::BoardCache;
use crate::error::WriteError;
use crate::model::{LinkOutcome, LinkState, MatchKind, RunReport, SourceEntity};
use crate::pacing::Pacer;

/// The write seam. The CLI backs this with the GraphQL client; tests back
/// it with a recording fake. Setting a relation overwrites the column with
/// exactly `target_ids` — the pass only reaches a write when the column
/// was empty, so there is nothing to merge with.
pub trait RelationWriter {
    fn set_relation(
        &mut self,
        board_id: &str,
        item_id: &str,
        column_id: &str,
        target_ids: &[String],
    ) -> Result<(), WriteError>;
}

#[derive(Debug, Clone)]
pub struct LinkPassOptions {
    /// Perform all reads and matching, issue no writes.
    pub dry_run: bool,
    pub allow_substring: bool,
    /// Skip the first N entities (resume support).
    pub start_from: usize,
    /// Process at most N entities after `start_from`.
    pub max_items: Option<usize>,
}

impl Default for LinkPassOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            allow_substring: true,
            start_from: 0,
            max_items: None,
        }
    }
}

/// One reconciliation pass: for every source entity, find its item on the
/// source board, resolve its relation names on the target board, and set
/// the relation column when it is empty. Every entity lands in a terminal
/// state; a rejected write is recorded and the loop continues.
pub fn run_link_pass(
    link_name: &str,
    source_board_id: &str,
    relation_column: &str,
    entities: &[SourceEntity],
    source: &BoardCache,
    targets: &BoardCache,
    writer: &mut dyn RelationWriter,
    pacer: &mut dyn Pacer,
    opts: &LinkPassOptions,
) -> RunReport {
    let window = entities
        .iter()
        .skip(opts.start_from)
        .take(opts.max_items.unwrap_or(usize::MAX));

    let mut outcomes = Vec::new();

    for entity in window {
        outcomes.push(reconcile_one(
            entity,
            source_board_id,
            relation_column,
            source,
            targets,
            writer,
            pacer,
            opts,
        ));
    }

    RunReport::new(link_name, opts.dry_run, outcomes)
}

fn reconcile_one(
    entity: &SourceEntity,
    source_board_id: &str,
    relation_column: &str,
    source: &BoardCache,
    targets: &BoardCache,
    writer: &mut dyn RelationWriter,
    pacer: &mut dyn Pacer,
    opts: &LinkPassOptions,
) -> LinkOutcome {
    let expected = entity.relation_names.len();

    let mut outcome = LinkOutcome {
        entity_id: entity.id,
        entity_name: entity.name.clone(),
        state: LinkState::SkippedNoSourceItem,
        source_item_id: None,
        source_match: None,
        targets_resolved: 0,
        targets_expected: expected,
        fuzzy_targets: false,
    };

    let Some((item, kind)) = source.find(&entity.name, opts.allow_substring) else {
        return outcome;
    };
    outcome.source_item_id = Some(item.id.clone());
    outcome.source_match = Some(kind);

    if !item.linked_ids.is_empty() {
        outcome.state = LinkState::SkippedAlreadyLinked { existing: item.linked_ids.len() };
        return outcome;
    }

    // Resolve relation names to target item ids, deduplicated in
    // first-seen order.
    let mut target_ids: Vec<String> = Vec::new();
    for name in &entity.relation_names {
        if let Some((target, kind)) = targets.find(name, opts.allow_substring) {
            if kind == MatchKind::Substring {
                outcome.fuzzy_targets = true;
            }
            if !target_ids.contains(&target.id) {
                target_ids.push(target.id.clone());
            }
            outcome.targets_resolved += 1;
        }
    }

    if target_ids.is_empty() {
        outcome.state = LinkState::SkippedNoTargets;
        return outcome;
    }

    if opts.dry_run {
        outcome.state = LinkState::Linked { targets: target_ids.len() };
        return outcome;
    }

    pacer.pace();
    match writer.set_relation(source_board_id, &item.id, relation_column, &target_ids) {
        Ok(()) => outcome.state = LinkState::Linked { targets: target_ids.len() },
        Err(e) => outcome.state = LinkState::Failed { error: e.to_string() },
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedItem;
    use crate::pacing::NoPacing;

    struct RecordingWriter {
        calls: Vec<(String, String, Vec<String>)>,
        /// 0-based call indexes that should be rejected.
        fail_on: Vec<usize>,
    }

    impl RecordingWriter {
        fn new() -> Self {
            Self { calls: Vec::new(), fail_on: Vec::new() }
        }

        fn failing_on(fail_on: Vec<usize>) -> Self {
            Self { calls: Vec::new(), fail_on }
        }
    }

    impl RelationWriter for RecordingWriter {
        fn set_relation(
            &mut self,
            _board_id: &str,
            item_id: &str,
            column_id: &str,
            target_ids: &[String],
        ) -> Result<(), WriteError> {
            let call_idx = self.calls.len();
            self.calls
                .push((item_id.to_string(), column_id.to_string(), target_ids.to_vec()));
            if self.fail_on.contains(&call_idx) {
                return Err(WriteError::new("simulated API rejection"));
            }
            Ok(())
        }
    }

    fn item(id: &str, name: &str) -> CachedItem {
        CachedItem { id: id.into(), name: name.into(), linked_ids: Vec::new() }
    }

    fn linked_item(id: &str, name: &str, links: &[&str]) -> CachedItem {
        CachedItem {
            id: id.into(),
            name: name.into(),
            linked_ids: links.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn entity(id: i64, name: &str, relations: &[&str]) -> SourceEntity {
        SourceEntity::new(id, name, relations.iter().map(|s| s.to_string()).collect())
    }

    fn pass(
        entities: &[SourceEntity],
        source: &BoardCache,
        targets: &BoardCache,
        writer: &mut RecordingWriter,
        opts: &LinkPassOptions,
    ) -> RunReport {
        run_link_pass(
            "test_link",
            "board_src",
            "relation_col",
            entities,
            source,
            targets,
            writer,
            &mut NoPacing,
            opts,
        )
    }

    #[test]
    fn links_when_column_empty() {
        let source = BoardCache::from_items([item("f1", "Hydrating Serum")]);
        let targets = BoardCache::from_items([item("i1", "Glycerin"), item("i2", "Squalane")]);
        let entities = vec![entity(1, "Hydrating Serum", &["Glycerin", "Squalane"])];
        let mut writer = RecordingWriter::new();

        let report = pass(&entities, &source, &targets, &mut writer, &LinkPassOptions::default());

        assert_eq!(report.summary.linked, 1);
        assert_eq!(writer.calls.len(), 1);
        let (item_id, col, ids) = &writer.calls[0];
        assert_eq!(item_id, "f1");
        assert_eq!(col, "relation_col");
        assert_eq!(ids, &["i1".to_string(), "i2".to_string()]);
    }

    #[test]
    fn second_run_is_idempotent() {
        // Same data, but the source item now carries the links the first
        // run created: nothing may be written again.
        let source = BoardCache::from_items([linked_item("f1", "Hydrating Serum", &["i1", "i2"])]);
        let targets = BoardCache::from_items([item("i1", "Glycerin"), item("i2", "Squalane")]);
        let entities = vec![entity(1, "Hydrating Serum", &["Glycerin", "Squalane"])];
        let mut writer = RecordingWriter::new();

        let report = pass(&entities, &source, &targets, &mut writer, &LinkPassOptions::default());

        assert_eq!(report.summary.already_linked, 1);
        assert_eq!(report.summary.linked, 0);
        assert!(writer.calls.is_empty());
    }

    #[test]
    fn partial_failure_containment() {
        // Write 2 of 4 is rejected; 3 and 4 must still be attempted.
        let source = BoardCache::from_items([
            item("f1", "A"),
            item("f2", "B"),
            item("f3", "C"),
            item("f4", "D"),
        ]);
        let targets = BoardCache::from_items([item("i1", "Glycerin")]);
        let entities = vec![
            entity(1, "A", &["Glycerin"]),
            entity(2, "B", &["Glycerin"]),
            entity(3, "C", &["Glycerin"]),
            entity(4, "D", &["Glycerin"]),
        ];
        let mut writer = RecordingWriter::failing_on(vec![1]);

        let report = pass(&entities, &source, &targets, &mut writer, &LinkPassOptions::default());

        assert_eq!(writer.calls.len(), 4);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.linked, 3);
        assert!(matches!(
            report.outcomes[1].state,
            LinkState::Failed { .. }
        ));
    }

    #[test]
    fn dry_run_issues_no_writes() {
        let source = BoardCache::from_items([item("f1", "Hydrating Serum")]);
        let targets = BoardCache::from_items([item("i1", "Glycerin")]);
        let entities = vec![entity(1, "Hydrating Serum", &["Glycerin"])];
        let mut writer = RecordingWriter::new();

        let opts = LinkPassOptions { dry_run: true, ..Default::default() };
        let report = pass(&entities, &source, &targets, &mut writer, &opts);

        assert!(writer.calls.is_empty());
        assert!(report.dry_run);
        // Intended change still reported.
        assert_eq!(report.summary.linked, 1);
    }

    #[test]
    fn empty_target_board_skips_everything() {
        // A missing/null item list upstream becomes an empty cache; every
        // entity must classify as no-targets, not crash.
        let source = BoardCache::from_items([item("f1", "A"), item("f2", "B")]);
        let targets = BoardCache::new();
        let entities = vec![entity(1, "A", &["Glycerin"]), entity(2, "B", &["Squalane"])];
        let mut writer = RecordingWriter::new();

        let report = pass(&entities, &source, &targets, &mut writer, &LinkPassOptions::default());

        assert_eq!(report.summary.no_targets, 2);
        assert!(writer.calls.is_empty());
    }

    #[test]
    fn missing_source_item_is_skipped() {
        let source = BoardCache::new();
        let targets = BoardCache::from_items([item("i1", "Glycerin")]);
        let entities = vec![entity(1, "Unknown Formula", &["Glycerin"])];
        let mut writer = RecordingWriter::new();

        let report = pass(&entities, &source, &targets, &mut writer, &LinkPassOptions::default());

        assert_eq!(report.summary.no_source_item, 1);
        assert!(writer.calls.is_empty());
    }

    #[test]
    fn duplicate_resolved_targets_deduplicated() {
        // "Water" and "Di Water" both resolve to the same remote item via
        // the substring fallback; the write must carry the id once.
        let source = BoardCache::from_items([item("f1", "Toner")]);
        let targets = BoardCache::from_items([item("i1", "Di Water")]);
        let entities = vec![entity(1, "Toner", &["Di Water", "Water"])];
        let mut writer = RecordingWriter::new();

        let report = pass(&entities, &source, &targets, &mut writer, &LinkPassOptions::default());

        assert_eq!(writer.calls[0].2, vec!["i1".to_string()]);
        assert_eq!(report.outcomes[0].targets_resolved, 2);
        assert!(report.outcomes[0].fuzzy_targets);
    }

    #[test]
    fn start_from_and_max_items_window() {
        let source = BoardCache::from_items([
            item("f1", "A"),
            item("f2", "B"),
            item("f3", "C"),
        ]);
        let targets = BoardCache::from_items([item("i1", "Glycerin")]);
        let entities = vec![
            entity(1, "A", &["Glycerin"]),
            entity(2, "B", &["Glycerin"]),
            entity(3, "C", &["Glycerin"]),
        ];
        let mut writer = RecordingWriter::new();

        let opts = LinkPassOptions { start_from: 1, max_items: Some(1), ..Default::default() };
        let report = pass(&entities, &source, &targets, &mut writer, &opts);

        assert_eq!(report.summary.total, 1);
        assert_eq!(report.outcomes[0].entity_name, "B");
        assert_eq!(writer.calls.len(), 1);
    }

    #[test]
    fn substring_disabled_drops_fuzzy_targets() {
        let source = BoardCache::from_items([item("f1", "Toner")]);
        let targets = BoardCache::from_items([item("i1", "Glycerin USP")]);
        let entities = vec![entity(1, "Toner", &["Glycerin"])];
        let mut writer = RecordingWriter::new();

        let opts = LinkPassOptions { allow_substring: false, ..Default::default() };
        let report = pass(&entities, &source, &targets, &mut writer, &opts);

        assert_eq!(report.summary.no_targets, 1);
        assert!(writer.calls.is_empty());
    }
}
