use super::*;

fn doc(text: &str) -> StyleDocument {
    StyleDocument::default().with_text(text)
}

#[test]
fn fresh_store_cannot_move() {
    let mut h = HistoryStore::new(doc("a"));
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert_eq!(h.undo().text, "a");
    assert_eq!(h.redo().text, "a");
    assert_eq!(h.len(), 1);
    assert!(!h.is_empty());
}

#[test]
fn undo_redo_walks_snapshots() {
    let mut h = HistoryStore::new(doc("a"));
    h.commit(doc("b"));
    h.commit(doc("c"));
    assert_eq!(h.cursor(), 2);
    assert_eq!(h.undo().text, "b");
    assert_eq!(h.undo().text, "a");
    assert_eq!(h.undo().text, "a");
    assert_eq!(h.redo().text, "b");
    assert_eq!(h.redo().text, "c");
    assert_eq!(h.redo().text, "c");
}

#[test]
fn commit_after_undo_truncates_redo_branch() {
    let mut h = HistoryStore::new(doc("a"));
    h.commit(doc("b"));
    h.commit(doc("c"));
    h.undo();
    h.undo();
    h.commit(doc("d"));
    assert!(!h.can_redo());
    let texts: Vec<_> = h.snapshots().iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts, ["a", "d"]);
    assert_eq!(h.cursor(), 1);
}

#[test]
fn edit_commits_a_derived_document() {
    let mut h = HistoryStore::default();
    let after = h.edit(|d| d.with_overlay(true)).clone();
    assert!(after.overlay);
    assert_eq!(h.len(), 2);
    assert!(!h.undo().overlay);
}
