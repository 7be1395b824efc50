use bridge_core::{dedupe, Document};

fn doc(title: &str, url: &str) -> Document {
    Document::new(title, "", url, None)
}

#[test]
fn keeps_first_occurrence_in_order() {
    let docs = vec![
        doc("Llama", "first"),
        doc("Diet", "a"),
        doc("llama", "second"),
        doc("Wool", "b"),
        doc("DIET", "c"),
    ];
    let out = dedupe(docs);
    let titles: Vec<&str> = out.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Llama", "Diet", "Wool"]);
    assert_eq!(out[0].source_url, "first");
}

#[test]
fn is_idempotent() {
    let docs = vec![doc("A", "1"), doc("B", "2"), doc("a", "3"), doc("C", "4"), doc("b", "5")];
    let once = dedupe(docs);
    let twice = dedupe(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn empty_input_stays_empty() {
    assert!(dedupe(Vec::new()).is_empty());
}
