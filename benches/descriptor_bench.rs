//! Descriptor scanning and parsing benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lightpath::*;
use std::fs;
use tempfile::TempDir;

fn large_descriptor() -> String {
    let mut content = String::from("// generated\nbuild {\n    build_version = \"1\"\n");
    for i in 0..90 {
        content.push_str(&format!("    command \"make -C source target_{}\"\n", i));
    }
    content.push_str("    build\n}\n\nmain {\n");
    for i in 0..90 {
        if i % 10 == 0 {
            content.push_str("    path_mode = \"current\"\n");
        }
        content.push_str(&format!("    command \"./bin/step_{} --verbose\"\n", i));
    }
    content.push_str("}\n");
    for f in 0..10 {
        content.push_str(&format!("task_{} {{ command \"echo {}\" }}\n", f, f));
    }
    content
}

fn bench_tokenize(c: &mut Criterion) {
    let content = large_descriptor();

    c.bench_function("tokenize", |b| {
        b.iter(|| Lexer::new(black_box(&content), "build.path").tokenize())
    });
}

fn bench_parse(c: &mut Criterion) {
    let content = large_descriptor();

    c.bench_function("parse_descriptor", |b| {
        b.iter(|| parse_descriptor(black_box(&content), "build.path").unwrap())
    });
}

fn bench_load_project(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.path");
    fs::write(&path, large_descriptor()).unwrap();

    c.bench_function("load_project", |b| {
        b.iter(|| load_project(black_box(&path)).unwrap())
    });
}

fn bench_runtime_codegen(c: &mut Criterion) {
    let project = parse_descriptor(&large_descriptor(), "build.path").unwrap();

    c.bench_function("runtime_codegen", |b| {
        b.iter(|| RuntimeGenerator::new(black_box(&project.main)).generate())
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_load_project,
    bench_runtime_codegen
);
criterion_main!(benches);
