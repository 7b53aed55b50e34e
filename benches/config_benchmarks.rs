use criterion::{criterion_group, criterion_main, Criterion};
use libris::config::loader::default_config_content;
use libris::Config;
use std::hint::black_box;

fn bench_config_serialization(c: &mut Criterion) {
    let config = Config::default();

    c.bench_function("config_to_toml", |b| {
        b.iter(|| toml::to_string(&black_box(&config)))
    });

    let toml_str = toml::to_string(&config).unwrap();
    c.bench_function("config_from_toml", |b| {
        b.iter(|| toml::from_str::<Config>(black_box(&toml_str)))
    });

    c.bench_function("config_from_generated_file", |b| {
        b.iter(|| toml::from_str::<Config>(black_box(default_config_content())))
    });
}

fn bench_session_path(c: &mut Criterion) {
    let config = Config::default();

    c.bench_function("session_resolved_path", |b| {
        b.iter(|| black_box(&config).session.resolved_path())
    });
}

criterion_group!(benches, bench_config_serialization, bench_session_path);
criterion_main!(benches);
