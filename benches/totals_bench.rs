use baumrechnung::core::{InvoiceData, ServiceLine, Unit, invoice_totals};
use baumrechnung::validation::schema::check_invoice;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

fn sample_invoice(line_count: usize) -> InvoiceData {
    let mut invoice = InvoiceData::new("04138-25", "15.06.2025", "25.06.2025");
    invoice.object = "Baumfällung in Schlangenbad".into();
    invoice.customer_name = "Erika Baumgartner".into();
    invoice.customer_address = "Hauptstr. 5, 65388 Schlangenbad".into();
    invoice.lines = (1..=line_count)
        .map(|i| {
            ServiceLine::new(
                i.to_string(),
                format!("Position {i}: Kronenschnitt und Abtransport"),
                Decimal::new(8550, 2),
                Decimal::new(250, 2),
                Unit::Hours,
            )
        })
        .collect();
    invoice.recalculate();
    invoice
}

fn bench_totals(c: &mut Criterion) {
    let invoice = sample_invoice(50);
    c.bench_function("invoice_totals_50_lines", |b| {
        b.iter(|| invoice_totals(black_box(&invoice.lines)))
    });

    c.bench_function("recalculate_50_lines", |b| {
        b.iter_batched(
            || invoice.clone(),
            |mut inv| {
                inv.recalculate();
                inv
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_schema(c: &mut Criterion) {
    let invoice = sample_invoice(50);
    c.bench_function("schema_check_50_lines", |b| {
        b.iter(|| check_invoice(black_box(&invoice)))
    });
}

criterion_group!(benches, bench_totals, bench_schema);
criterion_main!(benches);
