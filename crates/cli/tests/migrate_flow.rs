use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xref_cli::pipeline::{run_migration, RunOptions};
use xref_fixer::FixMode;
use xref_indexer::ScanOptions;
use xref_registry::RegistryStore;

fn options(root: &Path, side: &Path, mode: FixMode) -> RunOptions {
    RunOptions {
        root: root.to_path_buf(),
        scan: ScanOptions::default(),
        mode,
        backup_dir: side.join("backups"),
        registry_path: side.join("registry.json"),
        progress: false,
    }
}

fn setup(temp: &TempDir) -> (PathBuf, PathBuf) {
    let root = temp.path().join("corpus");
    fs::create_dir_all(&root).expect("create corpus");
    (root, temp.path().join("side"))
}

#[test]
fn legacy_annotation_becomes_canonical_id_and_registry_persists() {
    let temp = TempDir::new().expect("tempdir");
    let (root, side) = setup(&temp);
    fs::write(root.join("doc.md"), "# Title\n@references: ETHIK module\n").expect("write doc");

    let run = run_migration(&options(&root, &side, FixMode::Live)).expect("run");

    assert_eq!(run.annotations, 1);
    assert_eq!(run.references_migrated, 1);
    assert_eq!(run.files_modified, 1);
    assert_eq!(run.registry_entries, 1);
    assert!(run.registry_warning.is_none());

    let after = fs::read_to_string(root.join("doc.md")).expect("read back");
    assert_eq!(after, "# Title\n@references: EGOS-DOC-ETHIK-0001\n");

    let registry = RegistryStore::load(side.join("registry.json")).expect("reload");
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("ETHIK module").expect("mapping").to_string(),
        "EGOS-DOC-ETHIK-0001"
    );
}

#[test]
fn dry_run_reports_but_writes_neither_files_nor_registry() {
    let temp = TempDir::new().expect("tempdir");
    let (root, side) = setup(&temp);
    let original = "@references: KOIOS standards\n";
    fs::write(root.join("doc.md"), original).expect("write doc");

    let run = run_migration(&options(&root, &side, FixMode::DryRun)).expect("run");

    assert_eq!(run.references_migrated, 1);
    assert_eq!(run.files_modified, 0);
    assert_eq!(
        fs::read_to_string(root.join("doc.md")).expect("read back"),
        original
    );
    assert!(!side.join("registry.json").exists(), "dry run never flushes");
    assert!(!side.join("backups").exists());
}

#[test]
fn reused_legacy_text_gets_the_same_id_across_runs() {
    let temp = TempDir::new().expect("tempdir");
    let (root, side) = setup(&temp);
    fs::write(root.join("one.md"), "@references: NEXUS core\n").expect("write one");

    run_migration(&options(&root, &side, FixMode::Live)).expect("first run");

    // a second file naming the same legacy reference appears later
    fs::write(root.join("two.md"), "@references: NEXUS core\n").expect("write two");
    let second = run_migration(&options(&root, &side, FixMode::Live)).expect("second run");

    assert_eq!(second.registry_entries, 1, "existing mapping is reused");
    let one = fs::read_to_string(root.join("one.md")).expect("read one");
    let two = fs::read_to_string(root.join("two.md")).expect("read two");
    assert_eq!(one, "@references: EGOS-DOC-NEXUS-0001\n");
    assert_eq!(two, "@references: EGOS-DOC-NEXUS-0001\n");
}

#[test]
fn sequence_counters_are_per_type_and_subsystem() {
    let temp = TempDir::new().expect("tempdir");
    let (root, side) = setup(&temp);
    fs::write(
        root.join("doc.md"),
        "@references: ETHIK policy, ETHIK audit, KOIOS naming\n",
    )
    .expect("write doc");

    run_migration(&options(&root, &side, FixMode::Live)).expect("run");

    let after = fs::read_to_string(root.join("doc.md")).expect("read back");
    assert_eq!(
        after,
        "@references: EGOS-DOC-ETHIK-0001, EGOS-DOC-ETHIK-0002, EGOS-DOC-KOIOS-0001\n"
    );
}

#[test]
fn canonical_items_pass_through_unchanged() {
    let temp = TempDir::new().expect("tempdir");
    let (root, side) = setup(&temp);
    fs::write(
        root.join("doc.md"),
        "@references: EGOS-DOC-ATLAS-0007, MYCELIUM bus\n",
    )
    .expect("write doc");

    let run = run_migration(&options(&root, &side, FixMode::Live)).expect("run");

    assert_eq!(run.references_passed_through, 1);
    assert_eq!(run.references_migrated, 1);
    let after = fs::read_to_string(root.join("doc.md")).expect("read back");
    assert_eq!(
        after,
        "@references: EGOS-DOC-ATLAS-0007, EGOS-DOC-MYCELIUM-0001\n"
    );
}

#[test]
fn migration_is_idempotent() {
    let temp = TempDir::new().expect("tempdir");
    let (root, side) = setup(&temp);
    fs::write(root.join("doc.md"), "# Title\n@references: ATLAS map\n").expect("write doc");

    run_migration(&options(&root, &side, FixMode::Live)).expect("first run");
    let after_first = fs::read_to_string(root.join("doc.md")).expect("read");

    let second = run_migration(&options(&root, &side, FixMode::Live)).expect("second run");
    let after_second = fs::read_to_string(root.join("doc.md")).expect("read again");

    assert_eq!(after_first, after_second);
    assert_eq!(second.references_migrated, 0);
    assert_eq!(second.references_passed_through, 1);
    assert_eq!(second.files_modified, 0, "already-canonical file is untouched");
}

#[test]
fn code_files_get_code_typed_ids_with_comment_prefix_kept() {
    let temp = TempDir::new().expect("tempdir");
    let (root, side) = setup(&temp);
    fs::write(
        root.join("tool.py"),
        "# @references:\n#   - KOIOS logger\n#   - NEXUS analyzer\nprint('hi')\n",
    )
    .expect("write tool");

    run_migration(&options(&root, &side, FixMode::Live)).expect("run");

    let after = fs::read_to_string(root.join("tool.py")).expect("read back");
    assert_eq!(
        after,
        "# @references:\n#   - EGOS-CODE-KOIOS-0001\n#   - EGOS-CODE-NEXUS-0001\nprint('hi')\n"
    );
}

#[test]
fn backup_is_taken_before_a_live_rewrite() {
    let temp = TempDir::new().expect("tempdir");
    let (root, side) = setup(&temp);
    let original = "@references: CORUJA prompts\n";
    fs::write(root.join("doc.md"), original).expect("write doc");

    run_migration(&options(&root, &side, FixMode::Live)).expect("run");

    let run_dirs: Vec<_> = fs::read_dir(side.join("backups"))
        .expect("backup root")
        .map(|e| e.expect("entry").path())
        .collect();
    assert_eq!(run_dirs.len(), 1);
    let saved = fs::read_to_string(run_dirs[0].join("doc.md")).expect("backup copy");
    assert_eq!(saved, original);
}
