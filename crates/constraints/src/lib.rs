//! The two built-in constraints every new `Pool` is preinstalled with
//! (spec §4.4.1, §4.4.2), plus `install_builtins` to wire them onto a
//! freshly-constructed `alphatier_core::Pool`.

pub mod no_resource_overbooking;
pub mod optimistic_locking;

use alphatier_core::{ConstraintName, Pool};
use std::sync::Arc;

pub use no_resource_overbooking::{NoResourceOverbooking, NO_RESOURCE_OVERBOOKING};
pub use optimistic_locking::{OptimisticLocking, OPTIMISTIC_LOCKING};

/// Install the `optimistic-locking` pre-constraint and the
/// `no-resource-overbooking` post-constraint onto `pool`.
///
/// This is the only place the built-ins are wired up; it mirrors spec
/// §4.4's "new pools come with two built-ins preinstalled".
pub fn install_builtins(pool: &mut Pool) {
    pool.constraints.add_pre(
        ConstraintName::from(OPTIMISTIC_LOCKING),
        Arc::new(OptimisticLocking),
    );
    pool.constraints.add_post(
        ConstraintName::from(NO_RESOURCE_OVERBOOKING),
        Arc::new(NoResourceOverbooking),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_builtins_registers_both_under_exact_names() {
        let mut pool = Pool::new();
        install_builtins(&mut pool);
        assert_eq!(
            pool.constraints.pre_names(),
            vec![ConstraintName::from(OPTIMISTIC_LOCKING)]
        );
        assert_eq!(
            pool.constraints.post_names(),
            vec![ConstraintName::from(NO_RESOURCE_OVERBOOKING)]
        );
    }
}
