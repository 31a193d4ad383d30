//! Page content and how it is mounted as elements.
//!
//! A page is a list of sections, each with a heading and a grid of blocks.
//! Page files use a tiny line format:
//!
//! ```text
//! # Features
//! - [scaleIn] Fresh coffee all day
//! - Snacks and essentials
//! ```
//!
//! A `[type]` prefix picks the block's reveal; anything unrecognised falls
//! back to `fadeInUp`.

use std::path::Path;

use crate::core::animation::{AnimationConfig, AnimationType};
use crate::core::document::{Document, ElementId};
use crate::core::loader::LoadError;

use super::hours::WeeklyHours;

// ───────────────────────────────────────── content ───────────

/// Which part of the site a section plays.  Drives layout and the default
/// reveal of its blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Hero,
    About,
    Features,
    Hours,
    Contact,
    Map,
    Reviews,
    Other,
}

impl SectionKind {
    fn from_title(title: &str) -> Self {
        let t = title.to_lowercase();
        let has = |w: &str| t.contains(w);
        if has("welcome") || has("hero") {
            SectionKind::Hero
        } else if has("about") {
            SectionKind::About
        } else if has("feature") || has("product") || has("offer") {
            SectionKind::Features
        } else if has("hour") {
            SectionKind::Hours
        } else if has("contact") {
            SectionKind::Contact
        } else if has("map") || has("find us") || has("location") {
            SectionKind::Map
        } else if has("review") {
            SectionKind::Reviews
        } else {
            SectionKind::Other
        }
    }

    /// Cards sit side by side when there is room.
    pub fn is_grid(self) -> bool {
        matches!(self, SectionKind::Features | SectionKind::Reviews | SectionKind::Hours)
    }

    /// Reveal of the block at `index` when the page file doesn't name one.
    /// The map section is a map panel followed by the location card.
    fn default_block_animation(self, index: usize) -> AnimationType {
        match self {
            SectionKind::Features => AnimationType::ScaleIn,
            SectionKind::Map if index > 0 => AnimationType::FadeInLeft,
            _ => AnimationType::FadeInUp,
        }
    }

    /// Timing for the block at `index`, or `None` to keep the configured
    /// defaults.
    pub fn card_timing(self, index: usize) -> Option<Timing> {
        match self {
            SectionKind::Features | SectionKind::Reviews | SectionKind::Hours => Some(Timing::GRID_CARD),
            SectionKind::Map if index == 0 => Some(Timing::MAP_PANEL),
            SectionKind::Map => Some(Timing::LOCATION_CARD),
            _ => None,
        }
    }
}

/// Reveal timing in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub delay: f64,
    pub duration: f64,
    pub stagger: f64,
}

impl Timing {
    pub const HEADING: Timing = Timing {
        delay: 0.2,
        duration: 0.8,
        stagger: 0.0,
    };
    pub const GRID_CARD: Timing = Timing {
        delay: 0.1,
        duration: 0.6,
        stagger: 0.1,
    };
    pub const MAP_PANEL: Timing = Timing {
        delay: 0.4,
        duration: 0.8,
        stagger: 0.0,
    };
    pub const LOCATION_CARD: Timing = Timing {
        delay: 0.6,
        duration: 0.8,
        stagger: 0.0,
    };

    fn apply(self, config: AnimationConfig) -> AnimationConfig {
        config
            .with_delay(self.delay)
            .with_duration(self.duration)
            .with_stagger(self.stagger)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub text: String,
    pub animation: AnimationType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub sections: Vec<Section>,
}

impl Page {
    /// Parse the page line format.  Blocks before the first heading land in
    /// an untitled section.
    pub fn parse(src: &str) -> Self {
        let mut sections: Vec<Section> = Vec::new();

        for line in src.lines() {
            let line = line.trim();
            if let Some(title) = line.strip_prefix('#') {
                let title = title.trim().to_string();
                sections.push(Section {
                    kind: SectionKind::from_title(&title),
                    title,
                    blocks: Vec::new(),
                });
            } else if let Some(body) = line.strip_prefix('-') {
                if sections.is_empty() {
                    sections.push(Section {
                        title: String::new(),
                        kind: SectionKind::Other,
                        blocks: Vec::new(),
                    });
                }
                let Some(section) = sections.last_mut() else {
                    continue;
                };
                let body = body.trim();
                let index = section.blocks.len();
                let (animation, text) = match body.strip_prefix('[').and_then(|b| b.split_once(']')) {
                    Some((name, rest)) => (AnimationType::from_name_lossy(name), rest.trim()),
                    None => (section.kind.default_block_animation(index), body),
                };
                section.blocks.push(Block {
                    text: text.to_string(),
                    animation,
                });
            }
        }

        Self { sections }
    }

    /// Read and parse a page file.
    pub async fn read(path: &Path) -> Result<Self, LoadError> {
        let src = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::Failed(format!("{}: {e}", path.display())))?;
        let page = Self::parse(&src);
        if page.sections.is_empty() {
            return Err(LoadError::Failed(format!("{}: no sections", path.display())));
        }
        Ok(page)
    }

    /// The store's own page.
    pub fn builtin() -> Self {
        let mut src = String::from(
            "# Welcome to Jumbo\n\
             - Your family-run convenience store in Marsalforn, Gozo.\n\
             - Scroll down to explore.\n\
             # About Us\n\
             - We reopened this cozy shop because it holds a special place in our hearts.\n\
             - Fresh bread, milk and meats, alongside lactose-free and gluten-free options.\n\
             # Features\n\
             - Family-Run: a local business you can trust.\n\
             - Quality First: every product handpicked.\n\
             - Fresh Daily: bread and produce every morning.\n\
             - Special Options: lactose-free and gluten-free shelves.\n\
             - Personal Touch: we know our regulars by name.\n\
             - Community First: part of Marsalforn since day one.\n\
             # Hours\n",
        );
        for (day, time) in WeeklyHours::default().rows() {
            src.push_str(&format!("- {day}: {time}\n"));
        }
        src.push_str(
            "# Contact\n\
             - Triq Il-Qolla Is-Safra, Iż-Żebbuġ, Gozo\n\
             - Email: support@jumbo-convenience.com\n\
             - Phone: +356 7706 5767\n\
             # Find Us\n\
             - Interactive map unavailable, showing the address instead.\n\
             - Triq Il-Qolla Is-Safra, Marsalforn, Iż-Żebbuġ, Gozo, Malta (36.0721, 14.2554)\n\
             # Reviews\n\
             - \"Always friendly, always open when I need it.\" ★★★★★\n\
             - \"Lovely family shop with everything you need.\" ★★★★★\n\
             - \"Great range of gluten-free products.\" ★★★★★\n\
             - \"Quick service even at rush hour.\" ★★★★☆\n",
        );
        Self::parse(&src)
    }
}

// ───────────────────────────────────────── mounting ──────────

/// Role of a mounted element within its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Heading,
    /// Index into the section's blocks.
    Card(usize),
}

/// One observed element of the mounted page.
#[derive(Debug, Clone)]
pub struct PageItem {
    pub element: ElementId,
    pub section: usize,
    pub kind: ItemKind,
    pub config: AnimationConfig,
}

/// Build the element tree for `page`:
/// `root → section → { heading, grid → card* }`.
///
/// Cards share the grid as parent, so their sibling index drives the
/// stagger.  Per-item configs start from `defaults`; headings and the cards
/// of grid and map sections then take their section's [`Timing`].
pub fn mount(page: &Page, doc: &mut Document, defaults: &AnimationConfig) -> Vec<PageItem> {
    let mut items = Vec::new();
    let root = doc.root;

    for (si, section) in page.sections.iter().enumerate() {
        let section_el = doc.append(root, format!("section[{si}]"));
        let heading = doc.append(section_el, format!("section[{si}]/heading"));
        items.push(PageItem {
            element: heading,
            section: si,
            kind: ItemKind::Heading,
            config: Timing::HEADING.apply(defaults.clone().with_type(AnimationType::FadeInUp)),
        });

        let grid = doc.append(section_el, format!("section[{si}]/grid"));
        for (bi, block) in section.blocks.iter().enumerate() {
            let card = doc.append(grid, format!("section[{si}]/card[{bi}]"));
            let config = defaults.clone().with_type(block.animation);
            items.push(PageItem {
                element: card,
                section: si,
                kind: ItemKind::Card(bi),
                config: match section.kind.card_timing(bi) {
                    Some(timing) => timing.apply(config),
                    None => config,
                },
            });
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_blocks_and_types() {
        let page = Page::parse(
            "# Features\n- [slideInLeft] One\n- Two\n\n# Reviews\n- [bogus] Three\nstray line\n",
        );
        assert_eq!(page.sections.len(), 2);
        let features = &page.sections[0];
        assert_eq!(features.kind, SectionKind::Features);
        assert_eq!(features.blocks[0].animation, AnimationType::SlideInLeft);
        assert_eq!(features.blocks[0].text, "One");
        // Section default for feature cards.
        assert_eq!(features.blocks[1].animation, AnimationType::ScaleIn);
        assert_eq!(page.sections[1].blocks[0].animation, AnimationType::FadeInUp);
        assert_eq!(page.sections[1].blocks.len(), 1);
    }

    #[test]
    fn blocks_before_heading_get_untitled_section() {
        let page = Page::parse("- orphan\n# Next\n");
        assert_eq!(page.sections[0].title, "");
        assert_eq!(page.sections[0].blocks[0].text, "orphan");
        assert_eq!(page.sections[1].kind, SectionKind::Other);
    }

    #[test]
    fn builtin_page_has_every_section() {
        let kinds: Vec<_> = Page::builtin().sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Hero,
                SectionKind::About,
                SectionKind::Features,
                SectionKind::Hours,
                SectionKind::Contact,
                SectionKind::Map,
                SectionKind::Reviews,
            ]
        );
    }

    #[test]
    fn mount_gives_cards_sibling_positions() {
        let page = Page::parse("# Features\n- a\n- b\n- c\n");
        let mut doc = Document::new();
        let items = mount(&page, &mut doc, &AnimationConfig::default());
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].kind, ItemKind::Heading);
        let last = &items[3];
        assert_eq!(last.kind, ItemKind::Card(2));
        assert_eq!(doc.sibling_index(last.element), 2);
        assert!(last.config.stagger >= 0.1);
        assert_eq!(last.config.animation_type, AnimationType::ScaleIn);
    }

    #[test]
    fn mount_applies_section_timing() {
        let page = Page::parse("# About\n- story\n# Reviews\n- a\n- b\n# Find Us\n- map\n- address\n");
        let mut doc = Document::new();
        let items = mount(&page, &mut doc, &AnimationConfig::default());
        let find = |section: usize, kind: ItemKind| {
            items
                .iter()
                .find(|it| it.section == section && it.kind == kind)
                .map(|it| it.config.clone())
                .unwrap()
        };

        let heading = find(0, ItemKind::Heading);
        assert_eq!(heading.delay, 0.2);
        assert_eq!(heading.duration, 0.8);
        assert_eq!(heading.animation_type, AnimationType::FadeInUp);

        // Plain sections keep the configured defaults.
        let story = find(0, ItemKind::Card(0));
        assert_eq!(story.delay, 0.0);
        assert_eq!(story.duration, 0.6);

        let review = find(1, ItemKind::Card(1));
        assert_eq!(review.delay, 0.1);
        assert_eq!(review.stagger, 0.1);
        assert_eq!(review.animation_type, AnimationType::FadeInUp);
        let staggered = review.effective_delay(doc.sibling_index(items[4].element));
        assert!((staggered.as_secs_f64() - 0.2).abs() < 1e-9);

        let map = find(2, ItemKind::Card(0));
        assert_eq!((map.delay, map.animation_type), (0.4, AnimationType::FadeInUp));
        let location = find(2, ItemKind::Card(1));
        assert_eq!((location.delay, location.animation_type), (0.6, AnimationType::FadeInLeft));
    }

    #[tokio::test]
    async fn read_reports_missing_file() {
        let err = Page::read(Path::new("/definitely/not/here.page")).await;
        assert!(matches!(err, Err(LoadError::Failed(_))));
    }
}
