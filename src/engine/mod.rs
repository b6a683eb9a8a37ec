//! Pure transforms over already-fetched series: date join, derived fields,
//! classification. No I/O, no cross-call state; every call is independent.

pub mod align;
pub mod classify;
pub mod derive;
