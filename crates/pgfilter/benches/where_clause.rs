use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgfilter::{Field, Filter, build_where};

/// `n` fields cycling through comparison, membership, null check and range,
/// with a group opened every 4 fields and closed 2 fields later.
fn flat_fields(n: usize) -> Vec<Field> {
    (0..n)
        .map(|i| {
            let name = format!("col{i}");
            let mut field = match i % 4 {
                0 => Field::eq(name, i as i64),
                1 => Field::in_list(name, vec![1i64, 2, 3]),
                2 => Field::is_not_null(name).or(),
                _ => Field::between(name, 1i64, 100i64),
            };
            field.group_open = i % 4 == 0;
            field.group_close = i % 4 == 2;
            field
        })
        .collect()
}

fn tree_filter(n: usize) -> Filter {
    Filter::and(
        (0..n)
            .map(|i| {
                Filter::or(vec![
                    Filter::eq(format!("col{i}"), i as i64),
                    Filter::is_null(format!("col{i}")),
                ])
            })
            .collect(),
    )
}

fn bench_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_clause/flat");

    for n in [1, 5, 10, 50, 100] {
        let fields = flat_fields(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &fields, |b, fields| {
            b.iter(|| black_box(build_where(fields)));
        });
    }

    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_clause/tree");

    for n in [1, 5, 10, 50, 100] {
        let filter = tree_filter(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &filter, |b, filter| {
            b.iter(|| black_box(filter.build_where()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_flat, bench_tree);
criterion_main!(benches);
