//! Emission driver: decides which pages get a card and writes them.
//!
//! ## Phases
//!
//! ```text
//! prepare ──► fonts resolved once, icon read once
//!    │
//!    ▼
//! per page (parallel) ──► SKIP (custom social image)
//!                    └──► title/description → template → backend → write
//! ```
//!
//! A full build hands every eligible page to [`OgImageEmitter::emit_all`].
//! An incremental build hands the host's change list to
//! [`OgImageEmitter::emit_changes`], which re-renders added and changed pages
//! and ignores deletions. Images of deleted or renamed pages stay on disk.
//! Callers filter both inputs first with [`eligible_pages`] and
//! [`eligible_changes`], so `exclude_root` holds for either entry point.
//!
//! ## Output
//!
//! ```text
//! public/
//! ├── index-og-image.webp
//! └── notes/
//!     └── rust-og-image.webp
//! ```
//!
//! Paths come from the slug alone, so rebuilding overwrites in place.
//!
//! ## Failures
//!
//! One page failing to render or write never stops the batch. The error is
//! logged, streamed as [`EmitEvent::Failed`] and collected in
//! [`EmitReport::failed`]; the caller decides what a failed page means for
//! the build as a whole.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::fonts::{FontResolver, FontSet, FontStats};
use crate::meta::mime_for_url;
use crate::metadata::{effective_description, effective_title};
use crate::naming;
use crate::render::{RenderBackend, RenderError, Size};
use crate::template::TemplateInput;
use crate::types::{ChangeEvent, PageData};

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

/// Where a build writes its cards.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub output_dir: PathBuf,
}

impl BuildContext {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

/// Per-build resources shared by every page.
#[derive(Debug)]
pub struct Prepared {
    pub fonts: FontSet,
    /// Site icon as a `data:` URI.
    pub icon: Option<String>,
    pub font_stats: FontStats,
}

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    Written(PathBuf),
    /// The page declares its own social image.
    Skipped,
}

/// Progress events streamed while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitEvent {
    Written { slug: String, path: PathBuf },
    Skipped { slug: String },
    Failed { slug: String, error: String },
}

/// Aggregated result of a batch.
#[derive(Debug, Default)]
pub struct EmitReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<String>,
    /// `(slug, error)` for every page that failed.
    pub failed: Vec<(String, String)>,
    pub font_stats: FontStats,
}

impl EmitReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Read the site icon as a `data:` URI. A missing icon is not an error.
pub fn read_icon(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(data) => {
            let mime = mime_for_url(&path.to_string_lossy());
            Some(format!("data:{mime};base64,{}", BASE64.encode(data)))
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "icon not readable, rendering without it"
            );
            None
        }
    }
}

/// Pages a full build should consider. Drops the home page when the site
/// excludes it; everything else is decided per page by the emitter.
pub fn eligible_pages(pages: Vec<PageData>, config: &SiteConfig) -> Vec<PageData> {
    if !config.og_image.exclude_root {
        return pages;
    }
    pages
        .into_iter()
        .filter(|p| !naming::is_root_slug(&p.slug))
        .collect()
}

/// Changes an incremental build should consider, with the same home page
/// rule as [`eligible_pages`].
pub fn eligible_changes(changes: Vec<ChangeEvent>, config: &SiteConfig) -> Vec<ChangeEvent> {
    if !config.og_image.exclude_root {
        return changes;
    }
    changes
        .into_iter()
        .filter(|c| !naming::is_root_slug(&c.file.slug))
        .collect()
}

/// Renders Open Graph cards for a site.
pub struct OgImageEmitter<B: RenderBackend> {
    config: SiteConfig,
    resolver: FontResolver,
    backend: B,
}

impl<B: RenderBackend> OgImageEmitter<B> {
    pub fn new(config: SiteConfig, resolver: FontResolver, backend: B) -> Self {
        Self {
            config,
            resolver,
            backend,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve fonts and read the icon.
    pub fn prepare(&self) -> Prepared {
        let typography = &self.config.theme.typography;
        let (fonts, font_stats) = self.resolver.load(&typography.header, &typography.body);
        tracing::debug!(%font_stats, "fonts loaded");
        if fonts.is_empty() {
            tracing::warn!("no fonts resolved, cards will use system fallbacks");
        }
        Prepared {
            fonts,
            icon: read_icon(&self.config.og_image.icon),
            font_stats,
        }
    }

    /// Render and write one page's card.
    pub fn emit_page(
        &self,
        prepared: &Prepared,
        ctx: &BuildContext,
        page: &PageData,
    ) -> Result<EmitOutcome, EmitError> {
        if page.has_custom_image() {
            tracing::debug!(slug = %page.slug, "custom social image, skipping");
            return Ok(EmitOutcome::Skipped);
        }

        let options = &self.config.og_image;
        let title = effective_title(page, options, &self.config.page_title_suffix);
        let description = effective_description(page, options);
        let input = TemplateInput {
            page,
            title: &title,
            description: &description,
            fonts: &prepared.fonts,
            config: &self.config,
            options,
            icon: prepared.icon.as_deref(),
        };
        let tree = options.image_structure.build(&input);

        let size = Size::new(options.width, options.height);
        let bytes = self.backend.render(&tree, size, &prepared.fonts)?;

        let path = naming::og_image_path(&ctx.output_dir, &page.slug);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        tracing::debug!(slug = %page.slug, path = %path.display(), "card written");
        Ok(EmitOutcome::Written(path))
    }

    /// Full build: prepare once, then render every page in parallel.
    pub fn emit_all(
        &self,
        ctx: &BuildContext,
        pages: &[PageData],
        events: Option<Sender<EmitEvent>>,
    ) -> EmitReport {
        let prepared = self.prepare();
        self.emit_batch(&prepared, ctx, pages.iter().collect(), events)
    }

    /// Incremental build: render pages that were added or changed.
    pub fn emit_changes(
        &self,
        ctx: &BuildContext,
        changes: &[ChangeEvent],
        events: Option<Sender<EmitEvent>>,
    ) -> EmitReport {
        let pages: Vec<&PageData> = changes
            .iter()
            .filter(|c| c.needs_render())
            .map(|c| &c.file)
            .collect();
        if pages.is_empty() {
            return EmitReport::default();
        }
        let prepared = self.prepare();
        self.emit_batch(&prepared, ctx, pages, events)
    }

    fn emit_batch(
        &self,
        prepared: &Prepared,
        ctx: &BuildContext,
        pages: Vec<&PageData>,
        events: Option<Sender<EmitEvent>>,
    ) -> EmitReport {
        let results: Vec<(String, Result<EmitOutcome, EmitError>)> = pages
            .into_par_iter()
            .map_with(events, |tx, page| {
                let result = self.emit_page(prepared, ctx, page);
                let event = match &result {
                    Ok(EmitOutcome::Written(path)) => EmitEvent::Written {
                        slug: page.slug.clone(),
                        path: path.clone(),
                    },
                    Ok(EmitOutcome::Skipped) => EmitEvent::Skipped {
                        slug: page.slug.clone(),
                    },
                    Err(e) => {
                        tracing::error!(slug = %page.slug, error = %e, "card failed");
                        EmitEvent::Failed {
                            slug: page.slug.clone(),
                            error: e.to_string(),
                        }
                    }
                };
                if let Some(tx) = tx {
                    // Receiver gone means nobody is listening; the report still has it.
                    tx.send(event).ok();
                }
                (page.slug.clone(), result)
            })
            .collect();

        let mut report = EmitReport {
            font_stats: prepared.font_stats,
            ..EmitReport::default()
        };
        for (slug, result) in results {
            match result {
                Ok(EmitOutcome::Written(path)) => report.written.push(path),
                Ok(EmitOutcome::Skipped) => report.skipped.push(slug),
                Err(e) => report.failed.push((slug, e.to_string())),
            }
        }
        report
    }
}
