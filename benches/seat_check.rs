use cinema_booking::models::SeatLayout;
use cinema_booking::services::reservations::{validate_selection, ReservationIndex};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

// Nearly full house: every pair booked except H9/H10.
fn booked_lists(layout: &SeatLayout) -> Vec<String> {
    layout
        .seat_ids()
        .chunks(2)
        .take(39)
        .map(|pair| pair.join(","))
        .collect()
}

fn bench_reservation_index(c: &mut Criterion) {
    let layout = SeatLayout::standard();
    let lists = booked_lists(&layout);

    c.bench_function("reservation_index_from_lists", |b| {
        b.iter(|| ReservationIndex::from_seat_lists(black_box(&lists)))
    });
}

fn bench_validate_selection(c: &mut Criterion) {
    let layout = SeatLayout::standard();
    let index = ReservationIndex::from_seat_lists(booked_lists(&layout));
    let free = vec!["H9".to_string(), "H10".to_string()];
    let taken = vec!["A1".to_string(), "H10".to_string()];

    c.bench_function("validate_free_selection", |b| {
        b.iter(|| validate_selection(black_box(&free), &layout, &index).is_ok())
    });
    c.bench_function("validate_conflicting_selection", |b| {
        b.iter(|| validate_selection(black_box(&taken), &layout, &index).is_err())
    });
}

criterion_group!(benches, bench_reservation_index, bench_validate_selection);
criterion_main!(benches);
