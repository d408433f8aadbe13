//! Property-based tests for the permute engine and its view primitives.

use proptest::prelude::*;
use strided_perm::{
    group_axes_copied, permute_add_into, permute_into, permute_to_array, Assign, GCounter,
    Permutation, PermutePlan, StridedArray,
};

// ============================================================================
// Test Utilities
// ============================================================================

/// Shapes of rank 0..=4 with extents 1..=4, paired with a random permutation.
fn shape_and_perm() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec(1usize..=4, 0..=4).prop_flat_map(|dims| {
        let rank = dims.len();
        (Just(dims), Just((0..rank).collect::<Vec<_>>()).prop_shuffle())
    })
}

fn iota(dims: &[usize]) -> StridedArray<i64> {
    let n: usize = dims.iter().product();
    StridedArray::from_vec_row_major((0..n as i64).collect(), dims).unwrap()
}

fn for_each_index(dims: &[usize], mut f: impl FnMut(&[usize])) {
    let mut c = GCounter::new(dims.len());
    for (axis, &d) in dims.iter().enumerate() {
        c.set_range(axis, 0, d - 1).unwrap();
    }
    while c.not_done() {
        f(c.index());
        c.advance();
    }
}

// ============================================================================
// Engine Properties
// ============================================================================

proptest! {
    /// Every source element lands at its permuted destination index.
    #[test]
    fn prop_element_placement((dims, dest) in shape_and_perm()) {
        let src = iota(&dims);
        let p = Permutation::new(&dest).unwrap();
        let out = permute_to_array(&src.view(), &p).unwrap();
        let mut visited = 0usize;
        for_each_index(&dims, |i| {
            assert_eq!(out.get(&p.apply_to_index(i)), src.get(i));
            visited += 1;
        });
        prop_assert_eq!(visited, src.len());
    }

    /// Permuting by P then by P's inverse restores the source.
    #[test]
    fn prop_inverse_round_trip((dims, dest) in shape_and_perm()) {
        let src = iota(&dims);
        let p = Permutation::new(&dest).unwrap();
        let there = permute_to_array(&src.view(), &p).unwrap();
        let back = permute_to_array(&there.view(), &p.inverse()).unwrap();
        prop_assert_eq!(back.dims(), src.dims());
        prop_assert_eq!(back.data(), src.data());
    }

    /// Identity permutation copies element-wise.
    #[test]
    fn prop_identity_copy(dims in prop::collection::vec(1usize..=5, 0..=4)) {
        let src = iota(&dims);
        let mut dst = StridedArray::<i64>::col_major(&dims).unwrap();
        permute_into(&mut dst.view_mut(), &src.view(), &Permutation::identity(dims.len()))
            .unwrap();
        for_each_index(&dims, |i| assert_eq!(dst.get(i), src.get(i)));
    }

    /// Accumulating twice into zeros equals twice the assigned result.
    #[test]
    fn prop_accumulate_not_idempotent((dims, dest) in shape_and_perm()) {
        let src = iota(&dims);
        let p = Permutation::new(&dest).unwrap();
        let assigned = permute_to_array(&src.view(), &p).unwrap();
        let mut acc = StridedArray::<i64>::row_major(assigned.dims()).unwrap();
        permute_add_into(&mut acc.view_mut(), &src.view(), &p).unwrap();
        permute_add_into(&mut acc.view_mut(), &src.view(), &p).unwrap();
        let doubled: Vec<i64> = assigned.iter().map(|x| 2 * x).collect();
        prop_assert_eq!(acc.data(), doubled.as_slice());
    }

    /// Any split of the outer configurations reproduces the full copy.
    #[test]
    fn prop_split_execution(
        (dims, dest) in shape_and_perm(),
        cut in 0.0f64..=1.0,
    ) {
        let src = iota(&dims);
        let p = Permutation::new(&dest).unwrap();
        let whole = permute_to_array(&src.view(), &p).unwrap();

        let mut split = StridedArray::<i64>::row_major(whole.dims()).unwrap();
        let plan = PermutePlan::new(src.range(), split.range(), &p).unwrap();
        let n = plan.outer_len();
        let mid = ((n as f64) * cut) as usize;
        let mut dst = split.view_mut();
        plan.execute_outer(mid..n, &mut dst, &src.view(), &Assign).unwrap();
        plan.execute_outer(0..mid, &mut dst, &src.view(), &Assign).unwrap();
        prop_assert_eq!(split.data(), whole.data());
    }
}

// ============================================================================
// View Properties
// ============================================================================

proptest! {
    /// A sub-tensor view reads exactly the elements of the source block.
    #[test]
    fn prop_sub_tensor_reads_block(
        (dims, bounds) in prop::collection::vec(1usize..=5, 1..=3).prop_flat_map(|dims| {
            let bounds: Vec<_> = dims
                .iter()
                .map(|&d| (0..d).prop_flat_map(move |lo| (Just(lo), lo + 1..=d)))
                .collect();
            (Just(dims), bounds)
        })
    ) {
        let src = iota(&dims);
        let start: Vec<usize> = bounds.iter().map(|b| b.0).collect();
        let stop: Vec<usize> = bounds.iter().map(|b| b.1).collect();
        let view = src.view().sub_tensor(&start, &stop).unwrap();
        let extents: Vec<usize> = start.iter().zip(&stop).map(|(a, b)| b - a).collect();
        prop_assert_eq!(view.dims(), extents.as_slice());
        for_each_index(&extents, |i| {
            let shifted: Vec<usize> = i.iter().zip(&start).map(|(a, b)| a + b).collect();
            assert_eq!(view.get(i), src.get(&shifted));
        });
    }

    /// The copying grouper agrees with the permuted view read in row-major order.
    #[test]
    fn prop_group_copy_matches_permuted_view(
        (dims, named) in prop::collection::vec(1usize..=4, 1..=4).prop_flat_map(|dims| {
            let rank = dims.len();
            (Just(dims), prop::collection::vec(any::<bool>(), rank))
        })
    ) {
        let src = iota(&dims);
        let axes: Vec<usize> = (0..dims.len()).filter(|&j| named[j]).collect();
        let grouped = group_axes_copied(&src.view(), &axes).unwrap();

        let rest: Vec<usize> = (0..dims.len()).filter(|&j| !named[j]).collect();
        let mut dest = vec![0usize; dims.len()];
        for (pos, &j) in axes.iter().chain(&rest).enumerate() {
            dest[j] = pos;
        }
        let view = src.view().permute(&Permutation::new(&dest).unwrap()).unwrap();
        let expected = view.to_vec();
        prop_assert_eq!(grouped.data(), expected.as_slice());

        let lead: usize = axes.iter().map(|&j| dims[j]).product();
        if axes.len() >= 2 {
            prop_assert_eq!(grouped.dims()[0], lead);
            prop_assert_eq!(grouped.ndim(), rest.len() + 1);
        } else {
            prop_assert_eq!(grouped.ndim(), dims.len());
        }
    }
}
