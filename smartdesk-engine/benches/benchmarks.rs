// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{criterion_group, criterion_main};


use engine_bench::{bench_apply_reading, bench_threshold_updates};

criterion_group!(benches, bench_apply_reading, bench_threshold_updates);
criterion_main!(benches);
