use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagesmith_editor::ModuleCatalog;
use pagesmith_layout::{blank_row, blank_section, IDGenerator, Layout, SectionKind};
use pagesmith_renderer::{render_layout, ContentCollections, RenderOptions, ViewRegistry};

fn large_layout() -> Layout {
    let catalog = ModuleCatalog::new();
    let mut ids = IDGenerator::default();
    let mut sections = Vec::new();

    for s in 0..20 {
        let mut section = blank_section(&mut ids, &format!("Section {}", s), SectionKind::Content);
        for _ in 0..4 {
            section.rows.push(blank_row(&mut ids));
        }
        for row in &mut section.rows {
            for column in &mut row.columns {
                for template in catalog.templates().take(6) {
                    column.modules.push(template.instantiate(ids.new_id("module")));
                }
            }
        }
        sections.push(section);
    }

    Layout::new(sections)
}

fn render_large_layout(c: &mut Criterion) {
    let layout = large_layout();
    let content = ContentCollections::default();
    let views = ViewRegistry::with_builtins();

    c.bench_function("render_large_layout", |b| {
        b.iter(|| {
            render_layout(
                black_box(&layout.sections),
                &content,
                &views,
                RenderOptions::default(),
            )
        })
    });
}

criterion_group!(benches, render_large_layout);
criterion_main!(benches);
