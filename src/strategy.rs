//! Render strategy classification.
//!
//! Exactly one strategy is chosen per render pass. A missing resource and a
//! directory are decided by the resolution alone; every file goes through an
//! ordered rule table where the first matching predicate wins:
//!
//! | # | Predicate | Strategy |
//! |---|-----------|----------|
//! | 1 | path is the site's own renderer | `SelfReference` |
//! | 2 | `png jpg jpeg gif svg webp` | `Image` |
//! | 3 | `mp4 webm mov` | `Video` |
//! | 4 | `mp3 ogg` | `Audio` |
//! | 5 | `pdf doc docx zip rar` | `Download` |
//! | 6 | `goto` | `Redirect` |
//! | 7 | `md html` | `Markup` |
//! | 8 | anything else | `Plaintext` |

use crate::config::RenderConfig;
use crate::naming;
use crate::resolve::Resolution;
use crate::types::ResourceKind;
use serde::Serialize;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg"];
pub const DOWNLOAD_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "zip", "rar"];
pub const REDIRECT_EXTENSIONS: &[&str] = &["goto"];
pub const MARKUP_EXTENSIONS: &[&str] = &["md", "html"];
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderStrategy {
    SelfReference,
    Image,
    Video,
    Audio,
    Download,
    Redirect,
    Markup,
    Plaintext,
    Directory,
    NotFound,
}

impl RenderStrategy {
    pub fn name(self) -> &'static str {
        match self {
            Self::SelfReference => "self-reference",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Download => "download",
            Self::Redirect => "redirect",
            Self::Markup => "markup",
            Self::Plaintext => "plaintext",
            Self::Directory => "directory",
            Self::NotFound => "not-found",
        }
    }

    /// Whether the loading flag clears before any content fetch.
    ///
    /// Only markup and plaintext wait for their fetch to complete.
    pub fn clears_loading_immediately(self) -> bool {
        !matches!(self, Self::Markup | Self::Plaintext)
    }
}

impl std::fmt::Display for RenderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

type Predicate = fn(&str, &RenderConfig) -> bool;

fn is_self_reference(path: &str, config: &RenderConfig) -> bool {
    path == config.self_reference
}

fn is_image(path: &str, _: &RenderConfig) -> bool {
    naming::has_extension(path, IMAGE_EXTENSIONS)
}

fn is_video(path: &str, _: &RenderConfig) -> bool {
    naming::has_extension(path, VIDEO_EXTENSIONS)
}

fn is_audio(path: &str, _: &RenderConfig) -> bool {
    naming::has_extension(path, AUDIO_EXTENSIONS)
}

fn is_download(path: &str, _: &RenderConfig) -> bool {
    naming::has_extension(path, DOWNLOAD_EXTENSIONS)
}

fn is_redirect(path: &str, _: &RenderConfig) -> bool {
    naming::has_extension(path, REDIRECT_EXTENSIONS)
}

fn is_markup(path: &str, _: &RenderConfig) -> bool {
    naming::has_extension(path, MARKUP_EXTENSIONS)
}

/// File rules in priority order.
const RULES: &[(Predicate, RenderStrategy)] = &[
    (is_self_reference, RenderStrategy::SelfReference),
    (is_image, RenderStrategy::Image),
    (is_video, RenderStrategy::Video),
    (is_audio, RenderStrategy::Audio),
    (is_download, RenderStrategy::Download),
    (is_redirect, RenderStrategy::Redirect),
    (is_markup, RenderStrategy::Markup),
];

/// Strategy for a file at `path`.
pub fn classify_file(path: &str, config: &RenderConfig) -> RenderStrategy {
    RULES
        .iter()
        .find(|(matches, _)| matches(path, config))
        .map_or(RenderStrategy::Plaintext, |(_, strategy)| *strategy)
}

/// Strategy for a resolution.
pub fn classify(resolution: &Resolution, config: &RenderConfig) -> RenderStrategy {
    let strategy = match resolution {
        Resolution::Missing => RenderStrategy::NotFound,
        Resolution::Found(resource) => match resource.kind {
            ResourceKind::Directory => RenderStrategy::Directory,
            ResourceKind::File => classify_file(&resource.path, config),
        },
    };
    tracing::debug!(strategy = %strategy, "classified");
    strategy
}
