use cpgexport::FilterRules;

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_default_rules_deny_listed_node_labels() {
    let rules = FilterRules::default();
    assert!(!rules.allows_node(&labels(&["LocalScope"])));
    assert!(!rules.allows_node(&labels(&["UnknownType"])));
    assert!(rules.allows_node(&labels(&["FunctionDeclaration"])));
}

#[test]
fn test_node_denied_when_any_label_is_listed() {
    let rules = FilterRules::default();
    assert!(!rules.allows_node(&labels(&["Declaration", "CatchClause"])));
    assert!(rules.allows_node(&labels(&["Declaration", "FunctionDeclaration"])));
}

#[test]
fn test_default_rules_deny_listed_edge_types() {
    let rules = FilterRules::default();
    assert!(!rules.allows_edge("EOG"));
    assert!(!rules.allows_edge("SCOPE"));
    assert!(rules.allows_edge("DFG"));
}

#[test]
fn test_empty_rules_allow_everything() {
    let rules = FilterRules::empty();
    assert!(rules.allows_node(&labels(&["LocalScope"])));
    assert!(rules.allows_edge("EOG"));
}

#[test]
fn test_custom_deny_entries() {
    let rules = FilterRules::empty()
        .deny_label("Comment")
        .deny_edge_type("ANNOTATES");
    assert!(!rules.allows_node(&labels(&["Comment"])));
    assert!(rules.allows_node(&labels(&["Block"])));
    assert!(!rules.allows_edge("ANNOTATES"));
    assert!(rules.allows_edge("DFG"));
}

#[test]
fn test_only_edge_type_restricts_to_that_type() {
    let rules = FilterRules::empty().only_edge_type("DFG");
    assert!(rules.allows_edge("DFG"));
    assert!(!rules.allows_edge("CALLS"));
}

#[test]
fn test_only_edge_type_does_not_override_deny_list() {
    let rules = FilterRules::empty()
        .deny_edge_type("DFG")
        .only_edge_type("DFG");
    assert!(!rules.allows_edge("DFG"));
}
