use super::*;

#[test]
fn test_reaches_follows_transitive_waits() {
    let mut waits = ImportWaits::new();
    waits.add(Path::new("a.js"), Path::new("b.js"));
    waits.add(Path::new("b.js"), Path::new("c.js"));
    assert!(waits.reaches(Path::new("a.js"), Path::new("c.js")));
    assert!(!waits.reaches(Path::new("c.js"), Path::new("a.js")));
    assert!(waits.reaches(Path::new("c.js"), Path::new("c.js")));
}

#[test]
fn test_reaches_terminates_on_cycles() {
    let mut waits = ImportWaits::new();
    waits.add(Path::new("a.js"), Path::new("b.js"));
    waits.add(Path::new("b.js"), Path::new("a.js"));
    assert!(!waits.reaches(Path::new("a.js"), Path::new("z.js")));
}

#[test]
fn test_remove_clears_finished_waits() {
    let mut waits = ImportWaits::new();
    waits.add(Path::new("a.js"), Path::new("b.js"));
    waits.add(Path::new("a.js"), Path::new("c.js"));
    waits.remove(Path::new("a.js"), Path::new("b.js"));
    assert!(!waits.reaches(Path::new("a.js"), Path::new("b.js")));
    assert!(waits.reaches(Path::new("a.js"), Path::new("c.js")));
    waits.remove(Path::new("a.js"), Path::new("c.js"));
    assert!(waits.is_empty());
}
