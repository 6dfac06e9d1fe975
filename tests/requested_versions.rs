use pydist::version::{
    RequestError, RequestSpec, Version, VersionSet, parse_range, parse_request, resolve_request,
};

fn v(major: u32, minor: u32) -> Version {
    Version::new(major, minor)
}

fn set(versions: &[(u32, u32)]) -> VersionSet {
    versions.iter().map(|&(a, b)| v(a, b)).collect()
}

fn names(versions: VersionSet) -> Vec<String> {
    versions.iter().map(|v| v.to_string()).collect()
}

const SUPPORTED: &[(u32, u32)] = &[(2, 4), (2, 5), (2, 6), (2, 7), (3, 0)];

#[test]
fn empty_and_dash_ranges_request_the_full_supported_set() {
    for expression in ["", "-"] {
        let spec = RequestSpec::from(parse_range(expression).unwrap());
        let resolved = resolve_request(&spec, &set(SUPPORTED), None, v(2, 7)).unwrap();
        assert_eq!(resolved, set(SUPPORTED), "expression {expression:?}");
    }
}

#[test]
fn bounded_interval_is_max_exclusive() {
    let spec = RequestSpec::from(parse_range("2.4-2.6").unwrap());
    let resolved = resolve_request(&spec, &set(SUPPORTED), None, v(2, 7)).unwrap();
    assert_eq!(names(resolved), ["2.4", "2.5"]);
}

#[test]
fn interval_with_explicit_bounds_selects_the_half_open_slice() {
    let supported = set(SUPPORTED);
    for (expression, min, max) in [("2.5-2.7", v(2, 5), v(2, 7)), ("2.4-3.0", v(2, 4), v(3, 0))] {
        let spec = RequestSpec::from(parse_range(expression).unwrap());
        let resolved = resolve_request(&spec, &supported, None, v(2, 7)).unwrap();
        let expected: VersionSet = supported.iter().filter(|v| min <= *v && *v < max).collect();
        assert_eq!(resolved, expected, "expression {expression:?}");
    }
}

#[test]
fn exact_version_resolves_to_itself_or_fails() {
    let spec = RequestSpec::from(parse_range("2.5").unwrap());
    let resolved = resolve_request(&spec, &set(SUPPORTED), None, v(2, 7)).unwrap();
    assert_eq!(names(resolved), ["2.5"]);

    let absent = resolve_request(&spec, &set(&[(2, 6), (2, 7)]), None, v(2, 7));
    assert_eq!(absent, Err(RequestError::EmptyResult));
}

#[test]
fn qualifier_union_of_exact_and_relational_fields() {
    let spec = parse_request("2.7,>=3.0").unwrap();
    let resolved =
        resolve_request(&spec, &set(&[(2, 6), (2, 7), (3, 0), (3, 1)]), None, v(2, 7)).unwrap();
    assert_eq!(names(resolved), ["2.7", "3.0", "3.1"]);
}

#[test]
fn all_and_current_conflict_regardless_of_supported_set() {
    assert!(matches!(
        parse_request("all,current"),
        Err(RequestError::Conflict(_))
    ));
}

#[test]
fn debsorted_orders_a_dependency_list_default_first() {
    let versions = set(&[(2, 6), (3, 1), (2, 5), (2, 4), (2, 7)]);
    let rendered: Vec<String> = versions
        .debsorted(v(2, 7))
        .iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(rendered, ["2.7", "3.1", "2.6", "2.5", "2.4"]);
}

#[test]
fn resolution_is_deterministic_across_calls() {
    let spec = parse_request(">= 2.5").unwrap();
    let first = resolve_request(&spec, &set(SUPPORTED), None, v(2, 7)).unwrap();
    let second = resolve_request(&spec, &set(SUPPORTED), None, v(2, 7)).unwrap();
    assert_eq!(first, second);
}
