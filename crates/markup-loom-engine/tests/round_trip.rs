use markup_loom_engine::syntaxes::markdown;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

/// Fixtures are written in canonical form, so they come back byte for byte.
#[rstest]
#[case("document")]
#[case("templates")]
fn fixture_round_trips(#[case] name: &str) {
    let md = fixture(name);
    let state = markdown::state();
    let nodes = state.deserialize(&md).unwrap();
    assert_eq!(state.serialize(nodes).unwrap(), md);
}

#[test]
fn serialization_is_idempotent_after_normalization() {
    let md = "#  Title  \n\n\n- a\n-   b\n\n~~~\ncode\n~~~\n";
    let state = markdown::state();
    let once = state.serialize(state.deserialize(md).unwrap()).unwrap();
    let twice = state.serialize(state.deserialize(&once).unwrap()).unwrap();
    assert_eq!(once, "# Title\n\n* a\n* b\n\n```\ncode\n```\n\n");
    assert_eq!(twice, once);
}

#[test]
fn document_structure() {
    let nodes = markdown::state()
        .deserialize_to_document(&fixture("document"))
        .unwrap()
        .nodes;
    let types: Vec<&str> = nodes.iter().filter_map(|n| n.node_type()).collect();
    assert_eq!(
        types,
        vec![
            "heading_1",
            "paragraph",
            "blockquote",
            "hr",
            "ul_item",
            "ul_item",
            "ol_item",
            "ol_item",
            "code_block",
            "code_block",
            "unstyled",
        ]
    );
}
