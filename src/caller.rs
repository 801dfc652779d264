use std::fmt;

const UNKNOWN: &str = "unknown";

/// Source location and function a log call was issued from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// `<file name>:<line>`, e.g. `orders.rs:42`.
    pub file: String,
    /// Bare function name without module path.
    pub func: String,
}

impl CallSite {
    /// Build a call site from raw compiler-provided parts.
    ///
    /// `function_path` is a fully qualified path such as
    /// `my_crate::orders::create::{{closure}}::__here`; it is reduced to
    /// `create`. Missing parts degrade to the `unknown` sentinels.
    pub fn new(file: &str, line: u32, function_path: &str) -> Self {
        let file = match short_file(file) {
            Some(name) if line > 0 => format!("{}:{}", name, line),
            _ => format!("{}:0", UNKNOWN),
        };
        let func = short_function(function_path)
            .unwrap_or(UNKNOWN)
            .to_string();
        CallSite { file, func }
    }

    /// Sentinel used when no location information is available.
    pub fn unknown() -> Self {
        CallSite {
            file: format!("{}:0", UNKNOWN),
            func: UNKNOWN.to_string(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file, self.func)
    }
}

fn short_file(path: &str) -> Option<&str> {
    path.rsplit(['/', '\\']).next().filter(|s| !s.is_empty())
}

fn short_function(path: &str) -> Option<&str> {
    let mut path = path.strip_suffix("::__here").unwrap_or(path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().filter(|s| !s.is_empty() && *s != "{{closure}}")
}

/// Fully qualified path of the enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_path {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        __type_name_of(__here)
    }};
}

/// Capture the [`CallSite`] of the macro invocation.
///
/// ```
/// let site = enriched_log::call_site!();
/// assert!(site.file.contains(':'));
/// assert!(!site.func.is_empty());
/// ```
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::caller::CallSite::new(file!(), line!(), $crate::__function_path!())
    };
}
