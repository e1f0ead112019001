//! Benchmarks for markdown parsing, layout and styling.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use markdansi::{
    Environment, RenderOptions, Renderer, StyleIntent, Styler, parse, render_with_env, wrap_text,
};
use std::fmt::Write;

const SMALL_DOC: &str = include_str!("fixtures/small.md");
const MEDIUM_DOC: &str = include_str!("fixtures/medium.md");

fn renderer(color: bool) -> Renderer {
    Renderer::new()
        .with_environment(Environment::PLAIN)
        .with_color(color)
        .with_width(80)
}

fn benchmark_parsing(c: &mut Criterion) {
    let large = MEDIUM_DOC.repeat(16);
    let docs = [
        ("small", SMALL_DOC),
        ("medium", MEDIUM_DOC),
        ("large", large.as_str()),
    ];

    let mut group = c.benchmark_group("markdansi/parsing");
    for (name, doc) in docs {
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), doc, |b, doc| {
            b.iter(|| black_box(parse(doc)));
        });
    }
    group.finish();
}

fn benchmark_full_render(c: &mut Criterion) {
    let large = MEDIUM_DOC.repeat(16);
    let docs = [
        ("small", SMALL_DOC),
        ("medium", MEDIUM_DOC),
        ("large", large.as_str()),
    ];

    let mut group = c.benchmark_group("markdansi/render");
    for (name, doc) in docs {
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("styled", name), doc, |b, doc| {
            let renderer = renderer(true);
            b.iter(|| black_box(renderer.render(doc)));
        });
        group.bench_with_input(BenchmarkId::new("plain", name), doc, |b, doc| {
            let renderer = renderer(false);
            b.iter(|| black_box(renderer.render(doc)));
        });
    }
    group.finish();
}

fn benchmark_elements(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdansi/elements");
    let renderer = renderer(true);

    let mut paragraphs = String::new();
    for i in 0..100 {
        let _ = write!(
            &mut paragraphs,
            "Paragraph {i} carries enough words to wrap a few times at eighty columns, \
             with a few function words for the orphan rule to consider.\n\n"
        );
    }
    group.bench_function("paragraphs_100", |b| {
        b.iter(|| black_box(renderer.render(&paragraphs)));
    });

    let mut nested_list = String::new();
    for i in 0..50 {
        let _ = writeln!(&mut nested_list, "- Item {i}");
        let _ = writeln!(&mut nested_list, "  - Nested {i}");
        let _ = writeln!(&mut nested_list, "    - [x] Deep {i}");
    }
    group.bench_function("nested_list", |b| {
        b.iter(|| black_box(renderer.render(&nested_list)));
    });

    let code_blocks = "```rust\nfn main() {\n    println!(\"Hello\");\n}\n```\n\n".repeat(50);
    group.bench_function("code_blocks_50", |b| {
        b.iter(|| black_box(renderer.render(&code_blocks)));
    });

    let mut table = String::from("| Key | Value | Notes |\n|---|:---:|---:|\n");
    for i in 0..50 {
        let _ = writeln!(
            &mut table,
            "| key-{i} | a value long enough to need shrinking | {i} |"
        );
    }
    for (name, options) in [
        ("table_truncate", RenderOptions::new().with_width(40)),
        ("table_wrap", RenderOptions::new().with_width(40).with_table_truncate(false)),
    ] {
        let options = options.with_color(true);
        group.bench_function(name, |b| {
            b.iter(|| black_box(render_with_env(&table, &options, &Environment::PLAIN)));
        });
    }

    group.finish();
}

fn benchmark_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdansi/primitives");

    let text = "the quick brown fox jumps over the lazy dog with a ".repeat(40);
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("wrap_text", |b| {
        b.iter(|| black_box(wrap_text(&text, 60, true)));
    });

    let styler = Styler::new(true);
    let intent = StyleIntent::new().color("#ff8800").bold().underline();
    group.bench_function("paint", |b| {
        b.iter(|| black_box(styler.paint("styled words", &intent)));
    });

    group.finish();
}

fn benchmark_themes(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdansi/themes");
    for name in markdansi::theme::THEME_NAMES {
        let renderer = renderer(true).with_theme(name);
        group.bench_function(name, |b| {
            b.iter(|| black_box(renderer.render(MEDIUM_DOC)));
        });
    }
    group.finish();
}

criterion_group!(
    markdansi_benches,
    benchmark_parsing,
    benchmark_full_render,
    benchmark_elements,
    benchmark_primitives,
    benchmark_themes
);
criterion_main!(markdansi_benches);
