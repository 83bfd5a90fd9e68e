pub(crate) mod grouped;
pub(crate) mod style;
pub(crate) mod styler;
pub(crate) mod tree;
