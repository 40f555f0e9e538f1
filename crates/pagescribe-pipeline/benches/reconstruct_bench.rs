// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for paragraph reconstruction on hard-wrapped page text.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pagescribe_core::ReconstructionOptions;
use pagescribe_pipeline::TextReconstructor;

/// Roughly one page of OCR-style output: wrapped prose, a heading, a list,
/// and a CJK block with stray spacing.
fn sample_page() -> String {
    let mut page = String::from("INTRODUCTION\n");
    for i in 0..20 {
        page.push_str(&format!(
            "  line {i} of wrapped  prose that continues onto the next line,and keeps\n"
        ));
    }
    page.push_str("the paragraph going until it finally ends.\n\n\n\n");
    page.push_str("1. first item\n2. second item\n- bullet item\n\n");
    for _ in 0..10 {
        page.push_str("这是一段用于测试的中文文本， 它会被合并成为一个完整的段落而不插入空格\n");
    }
    page
}

fn bench_reconstruct(c: &mut Criterion) {
    let page = sample_page();
    let reconstructor = TextReconstructor::new(ReconstructionOptions::default());

    c.bench_function("reconstruct page (all stages)", |b| {
        b.iter(|| black_box(reconstructor.process(black_box(&page))));
    });
}

criterion_group!(benches, bench_reconstruct);
criterion_main!(benches);
