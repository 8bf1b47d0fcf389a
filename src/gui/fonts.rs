//! Font setup
//! egui's bundled fonts have no Japanese glyphs, so a system CJK font is added as
//! a fallback. Without one the month labels switch to English.
//!
//! Candidates are parsed before use: epaint panics on the first frame when handed
//! bytes that are not a font.

use crate::data::Locale;
use ab_glyph::FontRef;
use egui::{FontData, FontDefinitions, FontFamily};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CJK_FONT_NAME: &str = "cjk-fallback";

const PLATFORM_CJK_FONTS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/fonts-japanese-gothic.ttf",
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "C:\\Windows\\Fonts\\YuGothM.ttc",
    "C:\\Windows\\Fonts\\msgothic.ttc",
];

/// Configured fonts first, then the platform defaults.
pub fn candidate_font_paths(configured: &[PathBuf]) -> Vec<PathBuf> {
    configured
        .iter()
        .cloned()
        .chain(PLATFORM_CJK_FONTS.iter().map(PathBuf::from))
        .collect()
}

/// A parsed CJK font. The bytes live until exit; egui and plotters both draw from them.
#[derive(Debug, Clone)]
pub struct CjkFont {
    pub path: PathBuf,
    pub bytes: &'static [u8],
}

/// First candidate that can be read and parses as a font.
pub fn find_cjk_font(candidates: &[PathBuf]) -> Option<CjkFont> {
    candidates.iter().find_map(|path| {
        let bytes = std::fs::read(path).ok()?;
        if let Err(e) = FontRef::try_from_slice(&bytes) {
            warn!("Skipping {}: {}", path.display(), e);
            return None;
        }
        Some(CjkFont {
            path: path.clone(),
            bytes: Box::leak(bytes.into_boxed_slice()),
        })
    })
}

/// Font definitions with `bytes` appended as the last fallback of both families.
pub fn with_cjk_fallback(bytes: &'static [u8]) -> FontDefinitions {
    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert(CJK_FONT_NAME.to_owned(), FontData::from_static(bytes).into());
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(CJK_FONT_NAME.to_owned());
    }
    fonts
}

/// Install the first usable candidate into egui.
pub fn install_cjk_font(ctx: &egui::Context, candidates: &[PathBuf]) -> Option<CjkFont> {
    let font = find_cjk_font(candidates)?;
    ctx.set_fonts(with_cjk_fallback(font.bytes));
    info!("Using {} for Japanese glyphs", font.path.display());
    Some(font)
}

/// Locale that can actually be displayed given the font outcome.
pub fn effective_locale(requested: Locale, cjk_font: Option<&Path>) -> Locale {
    match (requested, cjk_font) {
        (Locale::Ja, None) => {
            warn!("No CJK font found, falling back to English month labels");
            Locale::En
        }
        (locale, _) => locale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_configured_fonts_come_first() {
        let configured = vec![PathBuf::from("/opt/fonts/custom.ttf")];
        let candidates = candidate_font_paths(&configured);
        assert_eq!(candidates[0], configured[0]);
        assert_eq!(candidates.len(), PLATFORM_CJK_FONTS.len() + 1);
    }

    #[test]
    fn test_fallback_appended_to_both_families() {
        let fonts = with_cjk_fallback(&[0u8; 4]);
        assert!(fonts.font_data.contains_key(CJK_FONT_NAME));
        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            assert_eq!(
                fonts.families[&family].last().map(String::as_str),
                Some(CJK_FONT_NAME)
            );
        }
    }

    #[test]
    fn test_missing_font_falls_back_to_english() {
        assert_eq!(effective_locale(Locale::Ja, None), Locale::En);
        assert_eq!(
            effective_locale(Locale::Ja, Some(Path::new("/x.ttc"))),
            Locale::Ja
        );
        assert_eq!(effective_locale(Locale::En, None), Locale::En);
    }

    #[test]
    fn test_unreadable_candidates_install_nothing() {
        let ctx = egui::Context::default();
        let candidates = vec![PathBuf::from("/definitely/not/here.ttc")];
        assert!(install_cjk_font(&ctx, &candidates).is_none());
    }

    #[test]
    fn test_file_that_is_not_a_font_is_skipped() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("bogus.ttc");
        fs::write(&bogus, b"this is not a font").unwrap();

        let ctx = egui::Context::default();
        assert!(install_cjk_font(&ctx, &[bogus]).is_none());
        // Fonts untouched, so the first frame still lays out text
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("1月");
            });
        });
    }

    #[test]
    fn test_valid_font_after_bogus_one_is_installed() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("bogus.ttc");
        fs::write(&bogus, b"this is not a font").unwrap();
        let real = dir.path().join("real.ttf");
        let bundled = FontDefinitions::default().font_data["Ubuntu-Light"].font.to_vec();
        fs::write(&real, bundled).unwrap();

        let ctx = egui::Context::default();
        let font = install_cjk_font(&ctx, &[bogus, real.clone()]).unwrap();
        assert_eq!(font.path, real);
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("Jan");
            });
        });
    }
}
