//! Crate-internal scenario tests. Unit tests live next to the code they cover.

mod helpers;
