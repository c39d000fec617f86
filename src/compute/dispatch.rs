//! Workgroup dispatch math shared by the host and the simulation shader.

/// Number of workgroups needed to cover `grid_size` cells along one axis.
///
/// Equal to `ceil(grid_size / workgroup_size)`. The shader discards
/// invocations that fall past the grid edge.
#[inline]
pub fn workgroup_count(grid_size: u32, workgroup_size: u32) -> u32 {
    grid_size.div_ceil(workgroup_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_grid_sizes() {
        assert_eq!(workgroup_count(100, 8), 13);
        assert_eq!(workgroup_count(512, 8), 64);
        assert_eq!(workgroup_count(1, 8), 1);
        assert_eq!(workgroup_count(8, 8), 1);
        assert_eq!(workgroup_count(9, 8), 2);
    }

    proptest! {
        #[test]
        fn prop_covers_grid_without_spare_workgroup(grid in 1u32..10_000, wg in 1u32..64) {
            let count = workgroup_count(grid, wg);
            prop_assert!(count * wg >= grid);
            prop_assert!((count - 1) * wg < grid);
        }
    }
}
