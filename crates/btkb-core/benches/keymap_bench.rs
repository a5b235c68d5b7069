//! Criterion benchmarks for the key lookup tables.
//!
//! Every physical key event and every repeat tick goes through at least one
//! of these lookups, so they sit on the dispatch hot path.
//!
//! Run with:
//! ```bash
//! cargo bench --package btkb-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use btkb_core::keymap::android::keycode;
use btkb_core::keymap::KeyMapper;
use btkb_core::{ControlLayout, KeyLabel, KeyboardReport, NamedKey, ScreenProfile};

const BENCH_KEYCODES: &[u32] = &[
    keycode::A,
    keycode::Z,
    keycode::DIGIT_0,
    keycode::COMMA,
    keycode::SLASH,
    keycode::SPACE,
    keycode::ENTER,
    keycode::DEL,
    keycode::F1,
    keycode::DPAD_LEFT,
    24, // KEYCODE_VOLUME_UP, unmapped
];

const BENCH_CHARS: &[char] = &['a', 'Z', '1', '!', '?', ' ', '~', 'é'];

fn bench_physical_to_label(c: &mut Criterion) {
    c.bench_function("physical_to_label", |b| {
        b.iter(|| {
            for &code in BENCH_KEYCODES {
                black_box(KeyMapper::physical_to_label(black_box(code)));
            }
        })
    });
}

fn bench_char_usage(c: &mut Criterion) {
    c.bench_function("char_usage", |b| {
        b.iter(|| {
            for &ch in BENCH_CHARS {
                black_box(KeyMapper::char_usage(black_box(ch)));
            }
        })
    });
}

fn bench_named_usage(c: &mut Criterion) {
    c.bench_function("named_usage_all", |b| {
        b.iter(|| {
            for key in NamedKey::ALL {
                black_box(KeyMapper::named_usage(black_box(key)));
            }
        })
    });
}

fn bench_control_lookup(c: &mut Criterion) {
    let layout = ControlLayout::for_profile(ScreenProfile::Hd);
    c.bench_function("control_find_by_name", |b| {
        b.iter(|| black_box(layout.find(black_box("char_q"))))
    });
}

fn bench_encode_report(c: &mut Criterion) {
    c.bench_function("label_to_report_bytes", |b| {
        b.iter(|| {
            let label = black_box(KeyLabel::Char('A'));
            if let KeyLabel::Char(ch) = label {
                if let Some((modifier, usage)) = KeyMapper::char_usage(ch) {
                    black_box(KeyboardReport::key_down(modifier, usage).to_bytes());
                }
            }
        })
    });
}

criterion_group!(
    benches,
    bench_physical_to_label,
    bench_char_usage,
    bench_named_usage,
    bench_control_lookup,
    bench_encode_report
);
criterion_main!(benches);
