use cookiegate::cookies::psl::{is_public_suffix, PslRegistry};
use cookiegate::cookies::registry::DomainRegistry;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_psl_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("psl_lookup");

    // Test domains
    let domains = vec![
        "com",
        "co.uk",
        "github.io",
        "example.com",
        "google.com",
        "sub.example.com",
    ];

    group.bench_function("lookup_1000_mixed_domains", |b| {
        b.iter(|| {
            for _ in 0..166 {
                for domain in &domains {
                    black_box(is_public_suffix(domain));
                }
            }
        });
    });

    group.bench_function("registry_node_and_classify", |b| {
        b.iter(|| {
            for domain in &domains {
                if let Some(node) = PslRegistry.node(black_box(domain)) {
                    black_box(PslRegistry.classify(&node));
                }
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_psl_lookup);
criterion_main!(benches);
