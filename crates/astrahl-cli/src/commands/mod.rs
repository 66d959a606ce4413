pub(crate) mod baseline;
pub(crate) mod dot;
pub(crate) mod empirical;
pub(crate) mod fault_counts;
pub(crate) mod faults;
pub(crate) mod helpers;
pub(crate) mod propagate;
pub(crate) mod random_tree;
pub(crate) mod splits;
pub(crate) mod theoretical;
