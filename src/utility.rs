//! Small helpers shared between the typed profile layer and the numeric kernels.
use metfor::Quantity;

/// Strip the units off a slice of quantities so it can go through the numeric kernels.
#[inline]
pub(crate) fn unpack_all<Q: Quantity>(vals: &[Q]) -> Vec<f64> {
    vals.iter().map(|q| q.unpack()).collect()
}

/// Put the units back on after a trip through the numeric kernels.
#[inline]
pub(crate) fn pack_all<Q: Quantity>(vals: &[f64]) -> Vec<Q> {
    vals.iter().map(|&v| Q::pack(v)).collect()
}
