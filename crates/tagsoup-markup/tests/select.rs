use pretty_assertions::assert_eq;
use tagsoup_markup::error::SelectorError;
use tagsoup_markup::{Engine, NodeRef};

const SOURCE: &str = "[b]这件事[i]要请教@天蓝提琴 一[/i]下, 是吧@有点儿欢乐 [/b]，@果壳网孙小年";

fn nicknames<'a>(nodes: &[NodeRef<'a>]) -> Vec<&'a str> {
    nodes
        .iter()
        .filter_map(|node| node.inline().and_then(|m| m.nickname()))
        .collect()
}

#[test]
fn test_filter_by_name() {
    let engine = Engine::new();
    let doc = engine.parse(SOURCE);
    let mentions = doc.filter("__at__").unwrap();
    assert_eq!(
        nicknames(&mentions),
        vec!["天蓝提琴", "有点儿欢乐", "果壳网孙小年"]
    );
}

#[test]
fn test_filter_descendant_chain() {
    let engine = Engine::new();
    let doc = engine.parse(SOURCE);
    let mentions = doc.filter("b i __at__").unwrap();
    assert_eq!(nicknames(&mentions), vec!["天蓝提琴"]);
    assert!(doc.filter("quote __at__").unwrap().is_empty());
}

#[test]
fn test_filter_group() {
    let engine = Engine::new();
    let doc = engine.parse("[i]x[/i] http://a.com [b]y[/b] [i]z[/i]");
    let names: Vec<_> = doc
        .filter("i, __url__")
        .unwrap()
        .iter()
        .map(|n| n.to_markup())
        .collect();
    assert_eq!(names, vec!["[i]x[/i]", "[i]z[/i]", "http://a.com"]);
}

#[test]
fn test_filter_stops_at_match() {
    let engine = Engine::new();
    let doc = engine.parse("[quote]a[quote]b[/quote][/quote]");
    // nested quotes are text inside a quote
    assert_eq!(doc.filter("quote").unwrap().len(), 1);

    let doc = engine.parse("[ul][ul]x[/ul][/ul]");
    let lists = doc.filter("ul").unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].to_markup(), "[ul][ul]x[/ul][/ul]");
    assert_eq!(doc.filter("ul ul").unwrap().len(), 1);
}

#[test]
fn test_filter_aliases_keep_their_name() {
    let engine = Engine::new();
    let doc = engine.parse("[b]x[/b][bold]y[/bold]");
    assert_eq!(doc.filter("b").unwrap().len(), 1);
    assert_eq!(doc.filter("bold").unwrap().len(), 1);
}

#[test]
fn test_filter_errors() {
    let engine = Engine::new();
    let doc = engine.parse("x");
    assert_eq!(doc.filter(""), Err(SelectorError::Empty));
    assert!(matches!(
        doc.filter("a > b"),
        Err(SelectorError::Unsupported { .. })
    ));
}

#[test]
fn test_node_navigation() {
    let engine = Engine::new();
    let doc = engine.parse("a[b]x[/b]c");
    let bold = doc.filter("b").unwrap()[0];
    assert_eq!(bold.parent(), Some(doc.root()));
    assert_eq!(bold.previous_sibling().map(|n| n.to_markup()).as_deref(), Some("a"));
    assert_eq!(bold.next_sibling().map(|n| n.to_markup()).as_deref(), Some("c"));
    assert_eq!(bold.text(), "x");
}
