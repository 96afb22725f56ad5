// tfdocs-setup-core/src/platform.rs

//! Maps the host OS and CPU architecture onto the names terraform-docs uses
//! for its release archives.
//!
//! Both Node-style names (`win32`, `x64`) and Rust's `std::env::consts` names
//! (`windows`, `x86_64`) are accepted, so runner-provided values and the
//! compile-time host agree on the same table.

use std::env::consts;

/// Archive flavour published for a given OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

/// An OS/architecture pair in the upstream naming scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Builds a platform from raw names, mapping both halves.
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: map_os(os),
            arch: map_arch(arch),
        }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::new(consts::OS, consts::ARCH)
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    pub fn archive_format(&self) -> ArchiveFormat {
        if self.is_windows() {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::TarGz
        }
    }

    pub fn extension(&self) -> &'static str {
        map_extension(&self.os)
    }

    /// Appends `.exe` on Windows.
    pub fn binary_file_name(&self, name: &str) -> String {
        if self.is_windows() {
            format!("{}.exe", name)
        } else {
            name.to_string()
        }
    }
}

pub fn map_os(platform: &str) -> String {
    match platform {
        "win32" | "windows" => "windows".to_string(),
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    }
}

pub fn map_arch(arch: &str) -> String {
    match arch {
        "x32" | "x86" => "386".to_string(),
        "x64" | "x86_64" => "amd64".to_string(),
        "aarch64" => "arm64".to_string(),
        other => other.to_string(),
    }
}

pub fn map_extension(os: &str) -> &'static str {
    if os == "windows" {
        ArchiveFormat::Zip.extension()
    } else {
        ArchiveFormat::TarGz.extension()
    }
}
