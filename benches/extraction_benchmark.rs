use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use htpy_scanner::{extract_classes_from_content, scan_directory, ScanTarget};

/// Template source with `count` components using both class conventions
fn template_source(count: usize) -> String {
    let classes = [
        "flex", "flex-col", "items-center", "justify-center", "p-4", "m-2",
        "bg-blue-500", "text-white", "rounded-lg", "shadow-md", "hover:bg-blue-600",
        "grid", "grid-cols-3", "gap-4", "space-x-2", "space-y-4",
    ];

    let mut content = String::from("from htpy import button, div, p, span\n\n");
    for i in 0..count {
        let dotted = classes
            .iter()
            .cycle()
            .skip(i % classes.len())
            .take(6)
            .map(|c| format!(".{}", c))
            .collect::<Vec<_>>()
            .join(" ");
        let keyword = classes
            .iter()
            .cycle()
            .skip((i + 3) % classes.len())
            .take(6)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        content.push_str(&format!("def component_{}(items):\n", i));
        content.push_str(&format!("    return div(\"{}\")[\n", dotted));
        content.push_str(&format!("        p(class_=\"{}\")[\"Content {}\"],\n", keyword, i));
        content.push_str("        [span(\".item\")[item] for item in items],\n");
        content.push_str("        button(type=\"submit\")[\"Go\"],\n");
        content.push_str("    ]\n\n");
    }
    content
}

fn create_test_files(dir: &Path, count: usize, components: usize) {
    let content = template_source(components);
    for i in 0..count {
        let sub = dir.join(format!("app_{}", i % 10));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("views_{}.py", i)), &content).unwrap();
    }
}

fn benchmark_visitor(c: &mut Criterion) {
    let mut group = c.benchmark_group("visitor");

    for components in [10, 100, 1000].iter() {
        let source = template_source(*components);
        group.bench_with_input(
            BenchmarkId::new("components", components),
            &source,
            |b, source| {
                b.iter(|| extract_classes_from_content(black_box(source), "bench.py").unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_directory_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("directory_scan");
    group.sample_size(10);

    for count in [10, 100, 500].iter() {
        let temp_dir = TempDir::new().unwrap();
        create_test_files(temp_dir.path(), *count, 20);
        fs::write(temp_dir.path().join(".gitignore"), "app_0/\n*_1.py\n").unwrap();

        group.bench_with_input(
            BenchmarkId::new("file_count", count),
            count,
            |b, _| {
                b.iter(|| scan_directory(temp_dir.path(), &ScanTarget::All).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_visitor, benchmark_directory_scan);
criterion_main!(benches);
