pub(crate) mod line;
pub(crate) mod mesh;
pub(crate) mod quad;
