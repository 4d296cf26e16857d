use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rowcast::{Driver, DtoExtractor, Field, Hydrator, QueryBuilder, Row, Value};

#[derive(rowcast::Dto)]
struct Account {
    id: Field<i64>,
    owner_name: Field<String>,
    balance: Field<f64>,
    active: Field<bool>,
    closed_at: Field<Option<chrono::NaiveDateTime>>,
}

/// SELECT col0, col1, ... FROM t WHERE col0 = :p0 AND col1 = :p1 ... LIMIT 50 OFFSET 100
fn build_select(n: usize) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.select((0..n).map(|i| format!("col{i}"))).from_as("t", "x");
    for i in 0..n {
        qb.and_where(&format!("col{i} = :p{i}"))
            .set_parameter(format!("p{i}"), i as i64);
    }
    qb.order_by("col0", "desc").set_max_results(50).set_first_result(100);
    qb
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("qb/compile");
    let driver = Driver::Postgres;

    for n in [1, 5, 10, 50, 100] {
        let qb = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.get_sql(&driver)));
        });
    }

    group.finish();
}

fn bench_hydrate(c: &mut Criterion) {
    let hydrator = Hydrator::default();
    let row = Row::new()
        .with("id", "12345")
        .with("owner_name", "Alice")
        .with("balance", "1023.50")
        .with("active", 1)
        .with("closed_at", Value::Null);

    c.bench_function("hydrate/account", |b| {
        b.iter(|| black_box(hydrator.hydrate::<Account>(&row, None)));
    });
}

fn bench_extract(c: &mut Criterion) {
    let extractor = DtoExtractor::default();
    let account = Account {
        id: Field::Set(12345),
        owner_name: Field::Set("Alice".to_string()),
        balance: Field::Set(1023.5),
        active: Field::Set(true),
        closed_at: Field::Set(None),
    };

    c.bench_function("extract/account", |b| {
        b.iter(|| black_box(extractor.extract(&account, None)));
    });
}

criterion_group!(benches, bench_compile, bench_hydrate, bench_extract);
criterion_main!(benches);
