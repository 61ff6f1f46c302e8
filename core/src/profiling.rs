//! Optional Tracy instrumentation.
//!
//! Enable the `profiling` Cargo feature to emit spans and plots to the
//! [Tracy profiler](https://github.com/wolfpld/tracy):
//!
//! ```toml
//! [dependencies]
//! polymesh-core = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! Normal and tangent calculation and the shape generators are instrumented.
//! Without the feature every macro compiles to nothing.
//!
//! ```ignore
//! use polymesh_core::profiling::{profile_function, profile_scope};
//!
//! fn rebuild(mesh: &mut Mesh) {
//!     profile_function!();
//!     {
//!         profile_scope!("flatten");
//!         // ...
//!     }
//! }
//! ```

#[cfg(feature = "profiling")]
pub use tracy_client::{self, plot as tracy_plot, span};

/// Create a profiling span for the current scope.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span covering the enclosing function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a function span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Plot a value over time, e.g. polygon counts of generated meshes.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a value (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        let _ = $value;
    };
}

pub use profile_function;
pub use profile_plot;
pub use profile_scope;

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        profile_scope!("test_scope");
        profile_function!();
        profile_plot!("test_value", 42.0);
    }
}
