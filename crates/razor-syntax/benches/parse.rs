use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use razor_syntax::delegation::opaque_spans;
use razor_syntax::{ParseOptions, parse, parse_with};

/// A page with every kind of construct, repeated `size` times.
fn generate_template(size: usize) -> String {
    let base = r#"<section class="item @cls">
    @* item @i *@
    @if (Model.Items.Count > 0)
    {
        <ul>
            @foreach (var item in Model.Items)
            {
                <li @onclick="() => Select(item)">@item.Name (@(item.Price * 2))</li>
            }
        </ul>
    }
    else
    {
        <p>None</p>
    }
    @{ var label = "}"; }
</section>
"#;
    let header = "@model ListViewModel<Item>\n@using System.Linq\n";
    format!("{header}{}", base.repeat(size))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.sample_size(20);

    for size in [1, 10, 100] {
        let content = generate_template(size);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("template", size), &content, |b, content| {
            b.iter(|| {
                let tree = parse(std::hint::black_box(content)).unwrap();
                std::hint::black_box(tree);
            });
        });
    }

    group.finish();
}

fn bench_lenient_and_spans(c: &mut Criterion) {
    let mut group = c.benchmark_group("delegation");
    group.sample_size(20);

    let content = generate_template(50);
    let options = ParseOptions::default().with_strict_unterminated(false);

    group.bench_function("parse_lenient", |b| {
        b.iter(|| {
            let parse = parse_with(std::hint::black_box(&content), &options).unwrap();
            std::hint::black_box(parse);
        });
    });

    let tree = parse(&content).unwrap();
    group.bench_function("opaque_spans", |b| {
        b.iter(|| {
            let spans = opaque_spans(std::hint::black_box(&tree));
            std::hint::black_box(spans);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_lenient_and_spans);
criterion_main!(benches);
