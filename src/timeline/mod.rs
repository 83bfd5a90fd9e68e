pub(crate) mod clip;
pub(crate) mod group;
pub(crate) mod inline_data;
pub(crate) mod model;
pub(crate) mod resolve;
pub(crate) mod sequence;
pub(crate) mod track;
