//! Shared types used by the input, scene and render crates.

mod types;

pub use types::{Color, Transform};

pub fn crate_info() -> &'static str {
    concat!("boxstage-common v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().starts_with("boxstage-common v"));
    }
}
