use super::*;

fn names(list: &[&str]) -> Vec<MigrationName> {
    list.iter().map(|n| MigrationName::new(*n)).collect()
}

#[test]
fn test_slugify() {
    assert_eq!(slugify("Add users table"), "add_users_table");
    assert_eq!(slugify("  drop -- old/index!  "), "drop_old_index");
    assert_eq!(slugify("v2 API"), "v2_api");
    assert_eq!(slugify("***"), "");
}

#[test]
fn test_next_sequence_empty() {
    assert_eq!(next_sequence(&[]).unwrap(), "001");
}

#[test]
fn test_next_sequence_increments_highest() {
    let existing = names(&["001_init.sql", "009_b.sql", "002_a.sql"]);
    assert_eq!(next_sequence(&existing).unwrap(), "010");
}

#[test]
fn test_next_sequence_keeps_wider_prefix() {
    let existing = names(&["00001_init.sql"]);
    assert_eq!(next_sequence(&existing).unwrap(), "00002");
}

#[test]
fn test_next_sequence_ignores_unnumbered() {
    let existing = names(&["init.sql", "004_x.sql"]);
    assert_eq!(next_sequence(&existing).unwrap(), "005");
}

#[test]
fn test_next_sequence_rejects_exhausted_width() {
    let existing = names(&["001_init.sql", "999_last.sql"]);
    let err = next_sequence(&existing).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("3 digits"), "{msg}");
    assert!(msg.contains("1000"), "{msg}");
}

#[test]
fn test_next_sequence_fills_width_exactly() {
    let existing = names(&["998_prev.sql"]);
    assert_eq!(next_sequence(&existing).unwrap(), "999");
}
