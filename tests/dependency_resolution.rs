use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use pydist::dist::{
    DependencyCatalog, DependencyError, DependencyResolver, PackageQuery, QueryError,
    SearchPattern, validate,
};
use pydist::version::Version;

/// Canned package-database answers, recording every pattern it was asked.
struct FakeQuery {
    answer: BTreeSet<String>,
    asked: std::cell::RefCell<Vec<SearchPattern>>,
}

impl FakeQuery {
    fn returning(packages: &[&str]) -> Self {
        Self {
            answer: packages.iter().map(|s| s.to_string()).collect(),
            asked: std::cell::RefCell::new(Vec::new()),
        }
    }
}

impl PackageQuery for FakeQuery {
    fn packages_providing(&self, pattern: &SearchPattern) -> Result<BTreeSet<String>, QueryError> {
        self.asked.borrow_mut().push(pattern.clone());
        Ok(self.answer.clone())
    }
}

fn write_fragment(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

struct Fixture {
    _dir: TempDir,
    overrides: PathBuf,
    fragments: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let overrides = dir.path().join("pydist-overrides");
        let fragments = dir.path().join("dist");
        fs::create_dir(&fragments).unwrap();
        Self {
            _dir: dir,
            overrides,
            fragments,
        }
    }

    fn load(&self) -> DependencyCatalog {
        DependencyCatalog::load(&self.overrides, &self.fragments).unwrap()
    }
}

#[test]
fn duplicate_name_across_fragments_keeps_the_later_record() {
    let fixture = Fixture::new();
    write_fragment(&fixture.fragments, "01-first", "foo python-foo-old\n");
    write_fragment(&fixture.fragments, "02-second", "foo python-foo-new\n");

    let catalog = fixture.load();
    let record = catalog.lookup("foo", None).unwrap();
    assert_eq!(record.dependency, "python-foo-new");
}

#[test]
fn override_file_records_win_over_fragments() {
    let fixture = Fixture::new();
    fs::write(&fixture.overrides, "foo python-foo-local\n").unwrap();
    write_fragment(&fixture.fragments, "fragment", "foo python-foo-shipped\n");

    let catalog = fixture.load();
    assert_eq!(
        catalog.lookup("foo", None).unwrap().dependency,
        "python-foo-local"
    );
}

#[test]
fn several_records_for_one_name_cover_different_ranges() {
    let fixture = Fixture::new();
    write_fragment(
        &fixture.fragments,
        "foo",
        "foo -3.0 python-foo\nfoo 3.0- python3-foo\n",
    );

    let resolver = DependencyResolver::new(fixture.load(), FakeQuery::returning(&[]));
    assert_eq!(
        resolver.resolve("foo", Some(Version::new(2, 7))).unwrap(),
        "python-foo"
    );
    assert_eq!(
        resolver.resolve("foo", Some(Version::new(3, 1))).unwrap(),
        "python3-foo"
    );
}

#[test]
fn non_matching_record_falls_through_to_the_live_query() {
    let fixture = Fixture::new();
    write_fragment(&fixture.fragments, "foo", "foo 3.0- python3-foo\n");

    let query = FakeQuery::returning(&["python-foo"]);
    let resolver = DependencyResolver::new(fixture.load(), &query);
    assert_eq!(
        resolver.resolve("foo", Some(Version::new(2, 6))).unwrap(),
        "python-foo"
    );

    // the query saw the versioned search path, exactly as if the catalog
    // had no record at all
    let asked = query.asked.borrow();
    assert_eq!(asked.len(), 1);
    assert_eq!(asked[0].glob, "foo-?*.egg-info");
    assert!(asked[0].path_filter.contains("python2.6"));
}

#[test]
fn two_live_candidates_are_ambiguous_not_an_arbitrary_pick() {
    let fixture = Fixture::new();
    let query = FakeQuery::returning(&["python-foo", "python-foo-doc"]);
    let resolver = DependencyResolver::new(fixture.load(), query);

    match resolver.resolve("foo", None) {
        Err(DependencyError::Ambiguous { name, candidates }) => {
            assert_eq!(name, "foo");
            assert_eq!(candidates, ["python-foo", "python-foo-doc"]);
        }
        other => panic!("expected an ambiguity failure, got {other:?}"),
    }
}

#[test]
fn no_candidates_is_a_hard_failure() {
    let fixture = Fixture::new();
    let resolver = DependencyResolver::new(fixture.load(), FakeQuery::returning(&[]));
    assert!(matches!(
        resolver.resolve("ghost", None),
        Err(DependencyError::Unresolved { name }) if name == "ghost"
    ));
}

#[test]
fn validate_lints_without_loading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides");
    fs::write(&path, "foo python-foo\nbroken line here!\nbar python-bar\n").unwrap();
    assert!(!validate(&path).unwrap());

    fs::write(&path, "foo python-foo\nbar 2.6-3.0 python-bar\n").unwrap();
    assert!(validate(&path).unwrap());
}
