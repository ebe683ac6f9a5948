//! End-to-end tests for markup template rendering.

use stencil::markup::{
    compose_fragments, parse_document, render_document, validate_document, write_document,
};
use stencil::{DataSets, MapRecord, Miss, Record, RenderOptions};

#[derive(Clone, Record)]
#[record(rename_all = "PascalCase")]
struct Order {
    number: String,
    urgent: bool,
    lines: Vec<Line>,
}

#[derive(Clone, Record)]
#[record(rename_all = "PascalCase")]
struct Line {
    item: String,
    qty: i64,
}

fn order() -> Order {
    Order {
        number: "A-17".into(),
        urgent: false,
        lines: vec![
            Line {
                item: "Bolt".into(),
                qty: 4,
            },
            Line {
                item: "Nut & washer".into(),
                qty: 6,
            },
        ],
    }
}

fn render(template: &str, data: &DataSets) -> String {
    let document = parse_document(template).unwrap();
    let out = render_document(&document, data, &RenderOptions::default()).unwrap();
    write_document(&out).unwrap()
}

#[test]
fn untouched_document_round_trips() {
    let template = "<html>\n  <head><title>Static</title></head>\n  <body class=\"x\"><p>a &amp; b</p><br/></body>\n</html>";
    assert_eq!(render(template, &DataSets::new()), template);
}

#[test]
fn rendering_twice_is_stable() {
    let template = r#"<p title="{{O::Number}}">{{O::Number}} {{Missing}}</p>"#;
    let data = DataSets::new().with("O", order());
    let once = render(template, &data);
    assert_eq!(render(&once, &data), once);
    assert_eq!(once, r#"<p title="A-17">A-17 {{Missing}}</p>"#);
}

#[test]
fn loop_over_nested_collection() {
    let data = DataSets::new().with("Lines", order().lines);
    let out = render(
        r#"<table><tr template-for="Lines"><td>{{Lines::Item}}</td><td>{{Lines::Qty}}</td></tr></table>"#,
        &data,
    );
    assert_eq!(
        out,
        "<table><tr><td>Bolt</td><td>4</td></tr><tr><td>Nut &amp; washer</td><td>6</td></tr></table>"
    );
}

#[test]
fn loop_over_record_property() {
    let data = DataSets::new().with("O", order());
    let out = render(
        r#"<ol><li template-for="O::Lines">{{O::Item}}</li></ol>"#,
        &data,
    );
    assert_eq!(out, "<ol><li>Bolt</li><li>Nut &amp; washer</li></ol>");
}

#[test]
fn nested_loops_see_outer_members() {
    let data = DataSets::new()
        .with(
            "G",
            vec![
                MapRecord::new().with("Title", "x").with("Tags", vec!["1", "2"]),
                MapRecord::new().with("Title", "y").with("Tags", vec!["3"]),
            ],
        );
    let out = render(
        r#"<div><section template-for="G"><i template-for="G::Tags">{{G}}</i></section></div>"#,
        &data,
    );
    assert_eq!(
        out,
        "<div><section><i>1</i><i>2</i></section><section><i>3</i></section></div>"
    );
}

#[test]
fn conditional_with_alternative() {
    let data = DataSets::new().with("O", order());
    let template = r#"<div><b template-if="O::Urgent">rush</b><span template-else="">normal</span></div>"#;
    assert_eq!(render(template, &data), "<div><span>normal</span></div>");

    let urgent = DataSets::new().with(
        "O",
        Order {
            urgent: true,
            ..order()
        },
    );
    assert_eq!(render(template, &urgent), "<div><b>rush</b></div>");
}

#[test]
fn orphan_alternative_is_kept() {
    let out = render(
        r#"<div><span template-else="">always</span></div>"#,
        &DataSets::new(),
    );
    assert_eq!(out, "<div><span>always</span></div>");
}

#[test]
fn malformed_markers() {
    let out = render(
        r#"<div><p template-if="{{}}">gone</p><p template-for="{{}}">plain</p></div>"#,
        &DataSets::new(),
    );
    assert_eq!(out, "<div><p>plain</p></div>");
}

#[test]
fn attribute_tokens_are_substituted() {
    let data = DataSets::new().with("Link", MapRecord::new().with("Url", "/a?b=1&c=2"));
    let out = render(r#"<a href="{{Link::Url}}">go</a>"#, &data);
    assert_eq!(out, r#"<a href="/a?b=1&amp;c=2">go</a>"#);
}

#[test]
fn aggregates_in_text() {
    let data = DataSets::new().with("Lines", order().lines);
    let out = render(
        "<p>{{Lines::Qty::Count}} lines, {{Lines::Qty::Sum}} units, {{Lines::Qty::Average}} avg</p>",
        &data,
    );
    assert_eq!(out, "<p>2 lines, 10 units, 5 avg</p>");
}

#[test]
fn composed_fragments_render() {
    let document = compose_fragments(
        &["<title>{{O::Number}}</title>"],
        &["<h1>Order {{O::Number}}</h1>", "<p template-if=\"O::Urgent\">rush</p>"],
    )
    .unwrap();
    let data = DataSets::new().with("O", order());
    let out = render_document(&document, &data, &RenderOptions::default()).unwrap();
    assert_eq!(
        write_document(&out).unwrap(),
        "<html><head><title>A-17</title></head><body><h1>Order A-17</h1></body></html>"
    );
}

#[test]
fn validate_reports_element_paths() {
    let document =
        parse_document(r#"<html><body><a href="{{Nope}}">{{O::Missing}}</a></body></html>"#)
            .unwrap();
    let data = DataSets::new().with("O", order());
    let misses = validate_document(&document, &data, &RenderOptions::default()).unwrap();

    assert_eq!(misses.len(), 2);
    assert_eq!(misses[0].location, "html/body/a");
    assert_eq!(misses[0].reason, Miss::MissingProperty);
    assert_eq!(misses[1].location, "html/body/a@href");
    assert_eq!(misses[1].reason, Miss::UnknownDataset);
}
