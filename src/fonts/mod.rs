//! Font loading for report rendering.
//!
//! `genpdf` lays text out with real glyph metrics, so a TrueType family has to be present on
//! disk. A family named `Name` is expected as `Name-Regular.ttf`, `Name-Bold.ttf`,
//! `Name-Italic.ttf` and `Name-BoldItalic.ttf` inside one directory. Directories are searched in
//! this order:
//!
//! 1. the configured `FONTS_DIR`,
//! 2. `assets/fonts` next to the running binary,
//! 3. `assets/fonts` in the crate sources.
//!
//! When the configured family is missing everywhere, the Liberation Sans family shipped by most
//! Linux distributions is tried as a fallback.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::warn;

const FONT_STYLES: &[&str] = &["Regular", "Bold", "Italic", "BoldItalic"];

const SYSTEM_FALLBACK_FAMILY_NAME: &str = "LiberationSans";

const SYSTEM_FALLBACK_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
];

/// Returns the bundled font directory inside the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn font_directory_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = configured {
        candidates.push(path.to_path_buf());
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path, family: &str) -> Vec<String> {
    FONT_STYLES
        .iter()
        .map(|style| format!("{family}-{style}.ttf"))
        .filter(|name| !path.join(name).is_file())
        .collect()
}

fn resolve_font_directory<I>(candidates: I, family: &str) -> Result<PathBuf, Error>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut attempts = Vec::new();

    for candidate in candidates {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_font_files(&candidate, family);
        if missing.is_empty() {
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate the '{}' font family. Checked: {}. Set FONTS_DIR or copy the fonts into assets/fonts.",
            family, summary
        ),
        io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
    ))
}

fn load_family_from(directory: &Path, family: &str) -> Result<FontFamily<FontData>, Error> {
    fonts::from_files(directory, family, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                family,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn system_fallback_font_family() -> Result<FontFamily<FontData>, Error> {
    let candidates = SYSTEM_FALLBACK_DIRECTORIES.iter().map(PathBuf::from);
    let directory = resolve_font_directory(candidates, SYSTEM_FALLBACK_FAMILY_NAME)?;
    load_family_from(&directory, SYSTEM_FALLBACK_FAMILY_NAME)
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads the configured font family, falling back to Liberation Sans when it cannot be found.
pub fn load_font_family(
    configured_dir: Option<&Path>,
    family: &str,
) -> Result<FontFamily<FontData>, Error> {
    let primary = resolve_font_directory(font_directory_candidates(configured_dir), family)
        .and_then(|directory| load_family_from(&directory, family));

    match primary {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match system_fallback_font_family() {
            Ok(fallback) => {
                warn!(
                    "Font family '{}' unavailable ({}); falling back to '{}'.",
                    family, err, SYSTEM_FALLBACK_FAMILY_NAME
                );
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Font family '{}' unavailable ({}); system fallback failed: {}",
                    family, err, fallback_err
                );
                Err(Error::new(
                    format!(
                        "Font family '{}' unavailable and system fallback failed: {}",
                        family, fallback_err
                    ),
                    io::Error::new(io::ErrorKind::NotFound, "report fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether [`load_font_family`] can find a usable family without loading it.
pub fn fonts_available(configured_dir: Option<&Path>, family: &str) -> bool {
    resolve_font_directory(font_directory_candidates(configured_dir), family).is_ok()
        || resolve_font_directory(
            SYSTEM_FALLBACK_DIRECTORIES.iter().map(PathBuf::from),
            SYSTEM_FALLBACK_FAMILY_NAME,
        )
        .is_ok()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn configured_directory_is_searched_first() {
        let configured = Path::new("/opt/report-fonts");
        let candidates = font_directory_candidates(Some(configured));
        assert_eq!(candidates.first().map(PathBuf::as_path), Some(configured));
        assert!(candidates.contains(&bundled_fonts_source_dir()));
    }

    #[test]
    fn resolution_lists_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Acme-Regular.ttf"), b"").unwrap();

        let err = resolve_font_directory(vec![dir.path().to_path_buf()], "Acme").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Acme-Bold.ttf"));
        assert!(!message.contains("Acme-Regular.ttf"));
        assert!(fonts_missing(&err));
    }

    #[test]
    fn resolution_accepts_complete_directory() {
        let dir = tempfile::tempdir().unwrap();
        for style in FONT_STYLES {
            fs::write(dir.path().join(format!("Acme-{style}.ttf")), b"").unwrap();
        }

        let resolved = resolve_font_directory(vec![dir.path().to_path_buf()], "Acme").unwrap();
        assert_eq!(resolved, dir.path());
    }
}
