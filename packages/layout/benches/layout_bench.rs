use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagesmith_layout::{blank_row, blank_section, parse, serialize, IDGenerator, Layout, Module, SectionKind};
use serde_json::Map;

fn large_layout() -> Layout {
    let mut ids = IDGenerator::default();
    let mut sections = Vec::new();

    for s in 0..20 {
        let mut section = blank_section(&mut ids, &format!("Section {}", s), SectionKind::Content);
        for _ in 0..4 {
            section.rows.push(blank_row(&mut ids));
        }
        for row in &mut section.rows {
            for column in &mut row.columns {
                for _ in 0..5 {
                    column.modules.push(Module {
                        id: ids.new_id("module"),
                        name: "text".to_string(),
                        category: "basic".to_string(),
                        default_props: Map::new(),
                        block_id: None,
                        icon: None,
                    });
                }
            }
        }
        sections.push(section);
    }

    Layout::new(sections)
}

fn serialize_large_layout(c: &mut Criterion) {
    let layout = large_layout();

    c.bench_function("serialize_large_layout", |b| {
        b.iter(|| serialize(black_box(&layout)))
    });
}

fn parse_large_layout(c: &mut Criterion) {
    let json = serialize(&large_layout()).expect("layout serializes");

    c.bench_function("parse_large_layout", |b| b.iter(|| parse(black_box(&json))));
}

fn parse_legacy_styles(c: &mut Criterion) {
    let json = r#"[{"id":"s1","name":"Hero","type":"header",
        "style":{"padding":{"top":40,"right":20,"bottom":40,"left":20},"borderWidth":1,"borderColor":"#ddd",
                 "shadow":{"x":0,"y":2,"blur":8,"color":"rgba(0,0,0,0.1)"}},
        "rows":[{"id":"r1","columns":[{"id":"c1","width":100,"modules":[]}]}]}]"#;

    c.bench_function("parse_legacy_styles", |b| b.iter(|| parse(black_box(json))));
}

criterion_group!(benches, serialize_large_layout, parse_large_layout, parse_legacy_styles);
criterion_main!(benches);
