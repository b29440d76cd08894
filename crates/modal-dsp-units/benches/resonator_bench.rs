// SPDX-License-Identifier: LGPL-3.0-or-later

//! Criterion benchmarks for rendering notes through the resonator bank.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use modal_dsp_units::modal::ResonatorBank;

fn bench_play_note(c: &mut Criterion) {
    let mut group = c.benchmark_group("resonator_note");

    for &frames in &[512, 4096, 44100] {
        let mut out = vec![0.0; frames];
        group.bench_with_input(BenchmarkId::from_parameter(frames), &frames, |b, _| {
            let mut bank = ResonatorBank::new(44100.0).unwrap();
            b.iter(|| {
                let _ = bank.play_note_into(black_box(220.0), black_box(&mut out));
            });
        });
    }
    group.finish();
}

fn bench_note_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("resonator_sequence");
    let notes = [110.0, 146.83, 196.0, 261.63, 329.63, 440.0, 587.33, 783.99];
    let mut out = vec![0.0; 2048];

    group.bench_function("eight_notes", |b| {
        let mut bank = ResonatorBank::new(48000.0).unwrap();
        b.iter(|| {
            for &f in &notes {
                let _ = bank.play_note_into(black_box(f), &mut out);
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_play_note, bench_note_sequence);
criterion_main!(benches);
