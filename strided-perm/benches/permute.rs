use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::hint::black_box;
use std::time::{Duration, Instant};
use strided_perm::{
    group_axes_copied, permute_add_into, permute_into, permute_into_with, Assign, Permutation,
    Range, StridedArray, Validation,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn median(samples: &mut [Duration]) -> Duration {
    samples.sort();
    let n = samples.len();
    if n % 2 == 1 {
        samples[n / 2]
    } else {
        (samples[n / 2 - 1] + samples[n / 2]) / 2
    }
}

fn bench_n(label: &str, warmup: usize, iters: usize, bytes: usize, mut f: impl FnMut()) {
    for _ in 0..warmup {
        f();
    }
    let mut samples = Vec::with_capacity(iters);
    for _ in 0..iters {
        let t0 = Instant::now();
        f();
        samples.push(t0.elapsed());
    }
    let med = median(&mut samples);
    let ms = med.as_secs_f64() * 1e3;
    let gbps = (bytes as f64) / med.as_secs_f64() / 1e9;
    let p25 = samples[samples.len() / 4].as_secs_f64() * 1e3;
    let p75 = samples[samples.len() * 3 / 4].as_secs_f64() * 1e3;
    println!("  {label:34} {ms:8.3} ms  ({p25:.3} / {p75:.3})  {gbps:6.2} GB/s");
}

fn random_array(dims: &[usize], seed: u64) -> StridedArray<f64> {
    let total: usize = dims.iter().product();
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f64> = (0..total).map(|_| rng.sample(StandardNormal)).collect();
    StridedArray::from_vec_row_major(data, dims).unwrap()
}

/// Element-at-a-time baseline: full offset dot-product per element.
fn naive_permute(dst: &mut StridedArray<f64>, src: &StridedArray<f64>, perm: &Permutation) {
    let dims = src.dims().to_vec();
    let rank = dims.len();
    let dst_range: Range = dst.range().clone();
    let mut idx = vec![0usize; rank];
    let total = src.len();
    for _ in 0..total {
        let t = perm.apply_to_index(&idx);
        let pd = dst_range.offset(&t) as usize;
        let ps = src.range().offset(&idx) as usize;
        dst.data_mut()[pd] = src.data()[ps];
        for d in (0..rank).rev() {
            idx[d] += 1;
            if idx[d] < dims[d] {
                break;
            }
            idx[d] = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

fn scenario(name: &str, dims: &[usize], perm: &[usize]) {
    println!("=== {name}: dims {dims:?}, perm {perm:?} ===");
    let perm = Permutation::new(perm).unwrap();
    let src = random_array(dims, 42);
    let dst_dims = src.range().permuted(&perm).dims().to_vec();
    let mut dst = StridedArray::<f64>::row_major(&dst_dims).unwrap();
    let bytes = src.len() * std::mem::size_of::<f64>() * 2;

    bench_n("naive (per-element offsets)", 1, 10, bytes, || {
        naive_permute(&mut dst, &src, &perm);
        black_box(dst.data().as_ptr());
    });

    bench_n("permute_into", 2, 20, bytes, || {
        permute_into(&mut dst.view_mut(), &src.view(), &perm).unwrap();
        black_box(dst.data().as_ptr());
    });

    bench_n("permute_into_with (unchecked)", 2, 20, bytes, || {
        permute_into_with(
            &mut dst.view_mut(),
            &src.view(),
            &perm,
            &Assign,
            Validation::Unchecked,
        )
        .unwrap();
        black_box(dst.data().as_ptr());
    });

    bench_n("permute_add_into", 2, 20, bytes, || {
        permute_add_into(&mut dst.view_mut(), &src.view(), &perm).unwrap();
        black_box(dst.data().as_ptr());
    });

    println!();
}

fn scenario_grouping() {
    println!("=== group_axes_copied: [64, 32, 64, 32], axes [0, 2] ===");
    let src = random_array(&[64, 32, 64, 32], 7);
    let bytes = src.len() * std::mem::size_of::<f64>() * 2;
    bench_n("group_axes_copied", 1, 10, bytes, || {
        let g = group_axes_copied(&src.view(), &[0, 2]).unwrap();
        black_box(g.data().as_ptr());
    });
    println!();
}

fn main() {
    scenario("matrix transpose", &[2048, 2048], &[1, 0]);
    scenario("rank-3 cycle", &[256, 128, 128], &[2, 0, 1]);
    scenario("small inner axis", &[4, 512, 512], &[1, 2, 0]);
    scenario("rank-6 mix", &[8, 12, 8, 12, 8, 12], &[5, 3, 1, 0, 2, 4]);
    scenario("24 axes of extent 2", &[2; 24], &[
        0, 1, 2, 3, 22, 4, 23, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21,
    ]);
    scenario_grouping();
}
