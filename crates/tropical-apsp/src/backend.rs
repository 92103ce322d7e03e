use std::fmt;
use std::str::FromStr;

use tropical_apsp_simd::{simd_level, SimdLevel};

/// Execution strategy for a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Serial below the configured threshold, tiled above it.
    #[default]
    Auto,
    /// Triple-loop Floyd-Warshall on the calling thread.
    Serial,
    /// Blocked Floyd-Warshall driven by the phase scheduler.
    Tiled,
}

impl Backend {
    /// Concrete backend for a graph with `vertex_count` vertices.
    pub fn resolve(self, vertex_count: usize, serial_threshold: usize) -> Backend {
        match self {
            Backend::Auto if vertex_count <= serial_threshold => Backend::Serial,
            Backend::Auto => Backend::Tiled,
            other => other,
        }
    }

    /// Get a description of the current SIMD capabilities.
    pub fn description() -> String {
        match simd_level() {
            SimdLevel::Scalar => "Portable (no SIMD)".to_string(),
            SimdLevel::Sse2 => "x86-64 SSE2 (128-bit)".to_string(),
            SimdLevel::Avx2 => "x86-64 AVX2 (256-bit)".to_string(),
            SimdLevel::Avx512 => "x86-64 AVX-512 (512-bit)".to_string(),
            SimdLevel::Neon => "ARM NEON (128-bit)".to_string(),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Auto => "auto",
            Backend::Serial => "serial",
            Backend::Tiled => "tiled",
        })
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "serial" => Ok(Backend::Serial),
            "tiled" => Ok(Backend::Tiled),
            other => Err(format!("unknown backend `{other}`")),
        }
    }
}

/// Get information about the library configuration.
pub fn version_info() -> String {
    format!(
        "tropical-apsp v{}\nSIMD: {}\nSIMD Level: {:?}\nThreads: {}",
        env!("CARGO_PKG_VERSION"),
        Backend::description(),
        simd_level(),
        rayon::current_num_threads()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(Backend::Auto.resolve(10, 64), Backend::Serial);
        assert_eq!(Backend::Auto.resolve(64, 64), Backend::Serial);
        assert_eq!(Backend::Auto.resolve(65, 64), Backend::Tiled);
        assert_eq!(Backend::Serial.resolve(10_000, 64), Backend::Serial);
        assert_eq!(Backend::Tiled.resolve(1, 64), Backend::Tiled);
    }

    #[test]
    fn test_parse_roundtrip() {
        for backend in [Backend::Auto, Backend::Serial, Backend::Tiled] {
            assert_eq!(backend.to_string().parse::<Backend>(), Ok(backend));
        }
        assert_eq!("TILED".parse::<Backend>(), Ok(Backend::Tiled));
        assert!("gpu".parse::<Backend>().is_err());
    }

    #[test]
    fn test_version_info_format() {
        let info = version_info();
        assert!(info.contains("tropical-apsp v"));
        assert!(info.contains("SIMD Level:"));
        assert!(!Backend::description().is_empty());
    }
}
